use model::entity::{ActivityCount, Entreprise};
use serde::{Serialize, Serializer, ser::SerializeMap, ser::SerializeSeq};

pub const SCHEMA_ORG: &str = "https://schema.org/";
pub const HYDRA_NS: &str = "http://www.w3.org/ns/hydra/core#";

/// `@context` of a document: schema.org plus the Hydra namespace, and for
/// collections the Hydra paging terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLdContext {
    Entity,
    Collection,
}

impl Serialize for JsonLdContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(SCHEMA_ORG)?;
        seq.serialize_element(&Terms(*self))?;
        seq.end()
    }
}

struct Terms(JsonLdContext);

impl Serialize for Terms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const PAGING: [(&str, &str); 6] = [
            ("view", "hydra:view"),
            ("first", "hydra:first"),
            ("last", "hydra:last"),
            ("next", "hydra:next"),
            ("previous", "hydra:previous"),
            ("totalItems", "hydra:totalItems"),
        ];

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("hydra", HYDRA_NS)?;
        if self.0 == JsonLdContext::Collection {
            for (term, iri) in PAGING {
                map.serialize_entry(term, iri)?;
            }
        }
        map.end()
    }
}

/// schema.org `Organization` view of one legal unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonLdContext>,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub identifier: String,
    pub name: Option<String>,
    #[serde(rename = "legalName")]
    pub legal_name: Option<String>,
    #[serde(rename = "alternativeName")]
    pub alternative_name: Option<String>,
    #[serde(rename = "foundingDate")]
    pub founding_date: Option<String>,
    pub naics: Option<String>,
    #[serde(rename = "numberOfEmployees")]
    pub number_of_employees: Option<String>,
    #[serde(rename = "legalForm")]
    pub legal_form: Option<String>,
    #[serde(rename = "additionalType")]
    pub additional_type: Option<String>,
    #[serde(rename = "socialEnterprise")]
    pub social_enterprise: bool,
    #[serde(rename = "isEmployer")]
    pub is_employer: bool,
}

impl Organization {
    /// Standalone document, carrying its own `@context`.
    pub fn document(entreprise: &Entreprise) -> Self {
        Organization {
            context: Some(JsonLdContext::Entity),
            ..Self::item(entreprise)
        }
    }

    /// Collection member; the collection carries the `@context`.
    pub fn item(e: &Entreprise) -> Self {
        Organization {
            context: None,
            kind: "Organization",
            id: format!("siren:{}", e.siren),
            identifier: e.siren.clone(),
            name: e.display_name().map(str::to_string),
            legal_name: e.denomination.clone(),
            alternative_name: e.sigle.clone(),
            founding_date: e.date_creation.map(|d| d.format("%Y-%m-%d").to_string()),
            naics: e.activite_principale.clone(),
            number_of_employees: e.tranche_effectifs.clone(),
            legal_form: e.categorie_juridique.clone(),
            additional_type: e.categorie_entreprise.clone(),
            social_enterprise: e.is_social_enterprise(),
            is_employer: e.is_employer(),
        }
    }
}

/// schema.org `AggregateRating` carrying the number of legal units of one
/// activity code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRating {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonLdContext>,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub identifier: String,
    #[serde(rename = "ratingCount")]
    pub rating_count: u64,
}

impl AggregateRating {
    pub fn document(count: &ActivityCount) -> Self {
        AggregateRating {
            context: Some(JsonLdContext::Collection),
            ..Self::item(count)
        }
    }

    pub fn item(count: &ActivityCount) -> Self {
        AggregateRating {
            context: None,
            kind: "AggregateRating",
            id: format!("activity:{}", count.code),
            identifier: count.code.clone(),
            rating_count: count.siren_count,
        }
    }
}
