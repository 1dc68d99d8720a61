use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A legal unit as read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entreprise {
    pub siren: String,
    pub nom: Option<String>,
    pub denomination: Option<String>,
    pub sigle: Option<String>,
    pub date_creation: Option<NaiveDate>,
    pub activite_principale: Option<String>,
    pub nomenclature_activite: Option<String>,
    pub tranche_effectifs: Option<String>,
    pub categorie_juridique: Option<String>,
    pub categorie_entreprise: Option<String>,
    pub economie_sociale_solidaire: Option<String>,
    pub caractere_employeur: Option<String>,
}

impl Entreprise {
    /// Display name: the person name when set, the legal name otherwise.
    pub fn display_name(&self) -> Option<&str> {
        self.nom.as_deref().or(self.denomination.as_deref())
    }

    pub fn is_social_enterprise(&self) -> bool {
        self.economie_sociale_solidaire.as_deref() == Some("O")
    }

    pub fn is_employer(&self) -> bool {
        self.caractere_employeur.as_deref() == Some("O")
    }
}

/// Number of legal units sharing one main activity code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCount {
    pub code: String,
    pub siren_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_person_name() {
        let mut e = Entreprise {
            siren: "000325175".into(),
            denomination: Some("ACME".into()),
            ..Default::default()
        };
        assert_eq!(e.display_name(), Some("ACME"));

        e.nom = Some("DUPONT".into());
        assert_eq!(e.display_name(), Some("DUPONT"));
    }

    #[test]
    fn test_flags() {
        let e = Entreprise {
            economie_sociale_solidaire: Some("O".into()),
            caractere_employeur: Some("N".into()),
            ..Default::default()
        };
        assert!(e.is_social_enterprise());
        assert!(!e.is_employer());
    }
}
