//! Which corporate-only fields the form shows, and how it labels the
//! registration fields. Derived from [`EntityType`] alone.

use serde::Serialize;

use crate::identifier::EntityType;
use crate::record::Field;

pub const OGRN_LABEL: &str = "ОГРН";
pub const OGRNIP_LABEL: &str = "ОГРНИП";
pub const KPP_OKPO_LABEL: &str = "КПП / ОКПО";
pub const OKPO_LABEL: &str = "ОКПО";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub ceo_post: bool,
    pub ceo_record_date: bool,
    pub ceo_restricted_note: bool,
    pub manager_is_org: bool,
    pub registration_code: bool,
    pub registration_number_label: &'static str,
    pub registration_code_label: &'static str,
}

impl Visibility {
    pub fn for_entity(entity: EntityType) -> Self {
        // A sole proprietor or a private person has no corporate officer.
        let corporate = entity == EntityType::LegalEntity;
        let proprietor = entity == EntityType::SoleProprietor;
        Self {
            ceo_post: corporate,
            ceo_record_date: corporate,
            ceo_restricted_note: corporate,
            manager_is_org: corporate,
            registration_code: entity != EntityType::PhysicalPerson,
            registration_number_label: if proprietor { OGRNIP_LABEL } else { OGRN_LABEL },
            registration_code_label: if proprietor { OKPO_LABEL } else { KPP_OKPO_LABEL },
        }
    }

    /// Fields the presentation layer should hide.
    pub fn hidden_fields(&self) -> Vec<Field> {
        [
            (Field::CeoPost, self.ceo_post),
            (Field::CeoRecordDate, self.ceo_record_date),
            (Field::CeoRestricted, self.ceo_restricted_note),
            (Field::ManagerIsOrg, self.manager_is_org),
            (Field::RegistrationCode, self.registration_code),
        ]
        .into_iter()
        .filter(|(_, shown)| !shown)
        .map(|(field, _)| field)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_entity_shows_everything() {
        let v = Visibility::for_entity(EntityType::LegalEntity);
        assert!(v.hidden_fields().is_empty());
        assert_eq!(v.registration_number_label, "ОГРН");
        assert_eq!(v.registration_code_label, "КПП / ОКПО");
    }

    #[test]
    fn sole_proprietor_hides_officer_fields() {
        let v = Visibility::for_entity(EntityType::SoleProprietor);
        assert_eq!(
            v.hidden_fields(),
            vec![
                Field::CeoPost,
                Field::CeoRecordDate,
                Field::CeoRestricted,
                Field::ManagerIsOrg
            ]
        );
        assert!(v.registration_code);
        assert_eq!(v.registration_number_label, "ОГРНИП");
        assert_eq!(v.registration_code_label, "ОКПО");
    }

    #[test]
    fn physical_person_hides_registration_code_too() {
        let v = Visibility::for_entity(EntityType::PhysicalPerson);
        assert_eq!(v.hidden_fields().len(), 5);
        assert!(!v.registration_code);
        assert_eq!(v.registration_number_label, "ОГРН");
    }
}
