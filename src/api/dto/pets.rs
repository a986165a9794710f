/*
 * Responsibility
 * - Pets の request/response DTO (JSON は camelCase)
 * - validate() で形式チェック
 */
use serde::{Deserialize, Serialize};

use crate::repos::Pet;

const MAX_TEXT_LEN: usize = 256;

/// Body of `POST /pets` and `PUT /pets/{pet_id}`.
///
/// `id` must be absent on create and equal the path id on update.
/// `owner` absent on update means "unchanged".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRequest {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub owner_display_name: Option<String>,
    pub name: String,
    pub species: Option<String>,
}

impl PetRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > MAX_TEXT_LEN {
            return Err("name must be <= 256 chars");
        }
        if let Some(species) = &self.species
            && species.len() > MAX_TEXT_LEN
        {
            return Err("species must be <= 256 chars");
        }
        if let Some(owner) = &self.owner
            && owner.trim().is_empty()
        {
            return Err("owner cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetResponse {
    pub id: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_display_name: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
}

impl From<Pet> for PetResponse {
    fn from(p: Pet) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            owner_display_name: p.owner_display_name,
            name: p.name,
            species: p.species,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_fields() {
        let req: PetRequest = serde_json::from_value(json!({
            "id": "p1",
            "owner": "alice",
            "ownerDisplayName": "alice@example.com",
            "name": "Rex",
            "species": "dog"
        }))
        .unwrap();
        assert_eq!(req.owner_display_name.as_deref(), Some("alice@example.com"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_name_or_owner_is_rejected() {
        let req: PetRequest = serde_json::from_value(json!({"name": "  "})).unwrap();
        assert_eq!(req.validate(), Err("name is required"));

        let req: PetRequest =
            serde_json::from_value(json!({"name": "Rex", "owner": ""})).unwrap();
        assert_eq!(req.validate(), Err("owner cannot be empty"));
    }

    #[test]
    fn response_omits_missing_optionals() {
        let res = PetResponse::from(Pet {
            id: "p1".into(),
            owner: "alice".into(),
            owner_display_name: None,
            name: "Rex".into(),
            species: None,
        });
        assert_eq!(
            serde_json::to_value(res).unwrap(),
            json!({"id": "p1", "owner": "alice", "name": "Rex"})
        );
    }
}
