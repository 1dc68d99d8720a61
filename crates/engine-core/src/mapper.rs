//! Source record to target record translation.

use model::{
    core::value::Value,
    records::{
        row::{FieldValue, TargetRecord},
        source::SourceRecord,
    },
};

/// INSEE `StockUniteLegale` field name to `unite_legale` column name.
pub static UNITE_LEGALE_COLUMNS: [(&str, &str); 34] = [
    ("siren", "siren"),
    ("statutDiffusionUniteLegale", "statut_diffusion_unite_legale"),
    ("unitePurgeeUniteLegale", "unite_purgee_unite_legale"),
    ("dateCreationUniteLegale", "date_creation_unite_legale"),
    ("sigleUniteLegale", "sigle_unite_legale"),
    ("sexeUniteLegale", "sexe_unite_legale"),
    ("prenom1UniteLegale", "prenom_1_unite_legale"),
    ("prenom2UniteLegale", "prenom_2_unite_legale"),
    ("prenom3UniteLegale", "prenom_3_unite_legale"),
    ("prenom4UniteLegale", "prenom_4_unite_legale"),
    ("prenomUsuelUniteLegale", "prenom_usuel_unite_legale"),
    ("pseudonymeUniteLegale", "pseudonyme_unite_legale"),
    ("identifiantAssociationUniteLegale", "identifiant_association_unite_legale"),
    ("trancheEffectifsUniteLegale", "tranche_effectifs_unite_legale"),
    ("anneeEffectifsUniteLegale", "annee_effectifs_unite_legale"),
    ("dateDernierTraitementUniteLegale", "date_dernier_traitement_unite_legale"),
    ("nombrePeriodesUniteLegale", "nombre_periodes_unite_legale"),
    ("categorieEntreprise", "categorie_entreprise"),
    ("anneeCategorieEntreprise", "annee_categorie_entreprise"),
    ("dateDebut", "date_debut"),
    ("etatAdministratifUniteLegale", "etat_administratif_unite_legale"),
    ("nomUniteLegale", "nom_unite_legale"),
    ("nomUsageUniteLegale", "nom_usage_unite_legale"),
    ("denominationUniteLegale", "denomination_unite_legale"),
    ("denominationUsuelle1UniteLegale", "denomination_usuelle_1_unite_legale"),
    ("denominationUsuelle2UniteLegale", "denomination_usuelle_2_unite_legale"),
    ("denominationUsuelle3UniteLegale", "denomination_usuelle_3_unite_legale"),
    ("categorieJuridiqueUniteLegale", "categorie_juridique_unite_legale"),
    ("activitePrincipaleUniteLegale", "activite_principale_unite_legale"),
    (
        "nomenclatureActivitePrincipaleUniteLegale",
        "nomenclature_activite_principale_unite_legale",
    ),
    ("nicSiegeUniteLegale", "nic_siege_unite_legale"),
    (
        "economieSocialeSolidaireUniteLegale",
        "economie_sociale_solidaire_unite_legale",
    ),
    ("societeMissionUniteLegale", "societe_mission_unite_legale"),
    ("caractereEmployeurUniteLegale", "caractere_employeur_unite_legale"),
];

/// Maps source records through a fixed translation table.
///
/// Every target column of the table is present in the output, in table
/// order, whether or not the source carried the field. Empty or absent
/// cells become NULL; anything else is passed through untouched.
#[derive(Debug, Clone, Copy)]
pub struct RowMapper {
    table: &'static [(&'static str, &'static str)],
}

impl RowMapper {
    pub const fn new(table: &'static [(&'static str, &'static str)]) -> Self {
        RowMapper { table }
    }

    pub const fn unite_legale() -> Self {
        RowMapper::new(&UNITE_LEGALE_COLUMNS)
    }

    pub fn map(&self, source: &SourceRecord) -> TargetRecord {
        let field_values = self
            .table
            .iter()
            .map(|(field, column)| FieldValue {
                name: column.to_string(),
                value: Value::from_raw(source.get(field)),
            })
            .collect();
        TargetRecord::new(field_values)
    }

    pub fn column_count(&self) -> usize {
        self.table.len()
    }
}

impl Default for RowMapper {
    fn default() -> Self {
        RowMapper::unite_legale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn source(fields: &[(&str, &str)]) -> SourceRecord {
        SourceRecord::new(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        )
    }

    #[test]
    fn test_table_is_a_bijection() {
        let fields: HashSet<_> = UNITE_LEGALE_COLUMNS.iter().map(|(f, _)| f).collect();
        let columns: HashSet<_> = UNITE_LEGALE_COLUMNS.iter().map(|(_, c)| c).collect();
        assert_eq!(fields.len(), 34);
        assert_eq!(columns.len(), 34);
    }

    #[test]
    fn test_every_column_present_in_table_order() {
        let mapper = RowMapper::unite_legale();
        let record = mapper.map(&source(&[("siren", "000325175")]));

        assert_eq!(record.field_values.len(), 34);
        assert!(record.columns().eq(UNITE_LEGALE_COLUMNS.iter().map(|(_, c)| *c)));
        assert_eq!(record.get_value("siren"), Value::String("000325175".into()));
        assert_eq!(record.get_value("nom_unite_legale"), Value::Null);
    }

    #[test]
    fn test_empty_cells_become_null_never_empty_string() {
        let mapper = RowMapper::unite_legale();
        let record = mapper.map(&source(&[
            ("siren", "000325175"),
            ("sigleUniteLegale", ""),
            ("nomUniteLegale", " DUPONT "),
        ]));

        assert_eq!(record.get_value("sigle_unite_legale"), Value::Null);
        // No trimming.
        assert_eq!(
            record.get_value("nom_unite_legale"),
            Value::String(" DUPONT ".into())
        );
        assert!(
            record
                .values()
                .all(|v| *v != Value::String(String::new()))
        );
    }

    #[test]
    fn test_unmapped_fields_are_dropped() {
        let record = RowMapper::unite_legale().map(&source(&[
            ("siren", "000325175"),
            ("champInconnu", "x"),
        ]));
        assert!(record.get("champInconnu").is_none());
        assert_eq!(record.field_values.len(), 34);
    }
}
