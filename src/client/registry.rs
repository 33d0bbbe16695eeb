use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered contact, held only for the current session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Please fill in all fields")]
    MissingFields,
}

/// Append-only, in-memory list of contacts
#[derive(Debug, Default)]
pub struct ContactRegistry {
    entries: Vec<Registration>,
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact. Both fields must be non-empty; the phone number
    /// is otherwise taken as given.
    pub fn register(&mut self, name: &str, phone: &str) -> Result<&Registration, RegistryError> {
        if name.is_empty() || phone.is_empty() {
            return Err(RegistryError::MissingFields);
        }

        self.entries.push(Registration {
            name: name.to_string(),
            phone: phone.to_string(),
            timestamp: Utc::now(),
        });

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[Registration] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up by 1-based position, as shown to the operator
    pub fn get(&self, position: usize) -> Option<&Registration> {
        position
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }

    /// Exact match on the stored phone string
    pub fn find_by_phone(&self, phone: &str) -> Option<&Registration> {
        self.entries.iter().find(|r| r.phone == phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_appends_one_record() {
        let mut registry = ContactRegistry::new();
        let before = Utc::now();

        let registration = registry.register("Ada", "+15551234567").unwrap().clone();

        assert_eq!(registry.len(), 1);
        assert_eq!(registration.name, "Ada");
        assert_eq!(registration.phone, "+15551234567");
        assert!(registration.timestamp >= before);
    }

    #[test]
    fn test_register_empty_fields_appends_nothing() {
        let mut registry = ContactRegistry::new();

        assert_eq!(
            registry.register("", "+15551234567"),
            Err(RegistryError::MissingFields)
        );
        assert_eq!(registry.register("Ada", ""), Err(RegistryError::MissingFields));
        assert_eq!(registry.register("", ""), Err(RegistryError::MissingFields));

        assert!(registry.is_empty());
        assert_eq!(
            RegistryError::MissingFields.to_string(),
            "Please fill in all fields"
        );
    }

    #[test]
    fn test_register_keeps_insertion_order_and_duplicates() {
        let mut registry = ContactRegistry::new();
        registry.register("Ada", "+15551234567").unwrap();
        registry.register("Grace", "+15557654321").unwrap();
        registry.register("Ada", "+15551234567").unwrap();

        let names: Vec<_> = registry.entries().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Grace", "Ada"]);
        assert!(registry.entries()[0].timestamp <= registry.entries()[1].timestamp);
    }

    #[test]
    fn test_register_does_not_validate_phone_format() {
        let mut registry = ContactRegistry::new();
        assert!(registry.register("Test", "not a number").is_ok());
    }

    #[test]
    fn test_get_is_one_based() {
        let mut registry = ContactRegistry::new();
        registry.register("Ada", "+15551234567").unwrap();
        registry.register("Grace", "+15557654321").unwrap();

        assert!(registry.get(0).is_none());
        assert_eq!(registry.get(1).unwrap().name, "Ada");
        assert_eq!(registry.get(2).unwrap().name, "Grace");
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_find_by_phone() {
        let mut registry = ContactRegistry::new();
        registry.register("Ada", "+15551234567").unwrap();

        assert_eq!(registry.find_by_phone("+15551234567").unwrap().name, "Ada");
        assert!(registry.find_by_phone(" +15551234567 ").is_none());
        assert!(registry.find_by_phone("+10000000000").is_none());
    }

    #[test]
    fn test_register_whitespace_fields_stored_as_given() {
        let mut registry = ContactRegistry::new();

        let registration = registry.register("  ", "\t").unwrap().clone();

        assert_eq!(registry.len(), 1);
        assert_eq!(registration.name, "  ");
        assert_eq!(registration.phone, "\t");
    }

    #[test]
    fn test_registration_timestamp_serializes_as_iso8601() {
        let mut registry = ContactRegistry::new();
        let registration = registry.register("Ada", "+15551234567").unwrap();

        let json = serde_json::to_value(registration).unwrap();
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
