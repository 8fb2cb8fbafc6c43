//! Client directory — read-only reference data for context resolution.
//!
//! Lookup tries exact `client_id` match first, then a case/whitespace
//! normalized email match. Unknown clients resolve to a synthetic
//! zero-tenure profile instead of an error; the tenure factor then
//! treats them as highest-risk, which is intentional business policy.

use serde::{Deserialize, Serialize};

/// A client profile from the reference directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub client_id: String,
    pub client_email: String,
    /// Tenure in years; fractional values are meaningful (0.5 = six months).
    pub antiguedad: f32,
    pub proyecto: String,
    pub sector: String,
}

/// In-memory client directory.
///
/// Read-only after construction; shared across requests without locking.
pub struct ClientDirectory {
    profiles: Vec<ClientProfile>,
}

impl ClientDirectory {
    /// Directory with the reference client book.
    pub fn seeded() -> Self {
        let profiles = vec![
            ClientProfile {
                client_id: "CLIENT-001".into(),
                client_email: "ti@finanzascorp.com".into(),
                antiguedad: 5.0,
                proyecto: "Implementación ERP Fase 2".into(),
                sector: "Fintech".into(),
            },
            ClientProfile {
                client_id: "CLIENT-002".into(),
                client_email: "fundadora@appinicio.com".into(),
                antiguedad: 1.0,
                proyecto: "App Móvil MVP".into(),
                sector: "Startup".into(),
            },
            ClientProfile {
                client_id: "CLIENT-003".into(),
                client_email: "soporte@retailco.com".into(),
                antiguedad: 3.0,
                proyecto: "Mantenimiento E-commerce".into(),
                sector: "Retail".into(),
            },
            ClientProfile {
                client_id: "CLIENT-004".into(),
                client_email: "operaciones@serviatech.co".into(),
                antiguedad: 0.5,
                proyecto: "Consultoría IA".into(),
                sector: "Servicios".into(),
            },
            ClientProfile {
                client_id: "CLIENT-005".into(),
                client_email: "ceo@legacy.net".into(),
                antiguedad: 10.0,
                proyecto: "Migración Cloud".into(),
                sector: "Banca".into(),
            },
        ];
        Self { profiles }
    }

    /// Empty directory (for testing).
    pub fn empty() -> Self {
        Self { profiles: Vec::new() }
    }

    /// Directory with custom profiles.
    pub fn with_profiles(profiles: Vec<ClientProfile>) -> Self {
        Self { profiles }
    }

    /// Resolve a client by id or email. Never fails — unknown clients
    /// get the synthetic default profile.
    pub fn resolve(&self, client_id: &str, client_email: Option<&str>) -> ClientProfile {
        let search_email = client_email.map(|e| e.trim().to_lowercase());

        for profile in &self.profiles {
            if profile.client_id == client_id {
                return profile.clone();
            }
            if let Some(ref email) = search_email
                && !email.is_empty()
                && profile.client_email.trim().to_lowercase() == *email
            {
                return profile.clone();
            }
        }

        ClientProfile {
            client_id: client_id.to_string(),
            client_email: client_email.unwrap_or_default().to_string(),
            antiguedad: 0.0,
            proyecto: "Sin Proyecto Asignado".into(),
            sector: "General".into(),
        }
    }
}

impl Default for ClientDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_exact_id() {
        let dir = ClientDirectory::seeded();
        let profile = dir.resolve("CLIENT-004", None);
        assert_eq!(profile.proyecto, "Consultoría IA");
        assert_eq!(profile.antiguedad, 0.5);
    }

    #[test]
    fn resolves_by_email_case_insensitive() {
        let dir = ClientDirectory::seeded();
        let profile = dir.resolve("unknown", Some("  CEO@Legacy.NET "));
        assert_eq!(profile.client_id, "CLIENT-005");
        assert_eq!(profile.antiguedad, 10.0);
    }

    #[test]
    fn id_match_wins_over_email() {
        let dir = ClientDirectory::seeded();
        let profile = dir.resolve("CLIENT-001", Some("ceo@legacy.net"));
        assert_eq!(profile.client_id, "CLIENT-001");
    }

    #[test]
    fn unknown_client_gets_default_profile() {
        let dir = ClientDirectory::seeded();
        let profile = dir.resolve("CLIENT-999", Some("nobody@nowhere.io"));
        assert_eq!(profile.antiguedad, 0.0);
        assert_eq!(profile.proyecto, "Sin Proyecto Asignado");
        assert_eq!(profile.sector, "General");
    }

    #[test]
    fn empty_email_does_not_match_empty_directory_entries() {
        let dir = ClientDirectory::with_profiles(vec![ClientProfile {
            client_id: "C-1".into(),
            client_email: "".into(),
            antiguedad: 2.0,
            proyecto: "X".into(),
            sector: "Y".into(),
        }]);
        let profile = dir.resolve("other", Some(""));
        assert_eq!(profile.proyecto, "Sin Proyecto Asignado");
    }
}
