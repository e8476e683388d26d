//! Database schema definitions

use crate::id::{FriendRequestIdType, IdType, UserIdType};

/// SQL schema definitions for the database
pub struct Schema;

/// A table and the indexes defined on it
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub name: String,
    pub schema: String,
    pub indexes: Vec<String>,
}

impl Schema {
    /// Get all table definitions
    pub fn tables() -> Vec<TableDefinition> {
        vec![
            Self::system_metadata(),
            Self::users(),
            Self::friend_requests(),
        ]
    }

    /// System metadata table
    pub fn system_metadata() -> TableDefinition {
        TableDefinition {
            name: "system_metadata".to_string(),
            schema: r#"
                DEFINE TABLE system_metadata SCHEMAFULL;
                DEFINE FIELD schema_version ON system_metadata TYPE int;
                DEFINE FIELD created_at ON system_metadata TYPE datetime;
                DEFINE FIELD updated_at ON system_metadata TYPE datetime;
            "#
            .to_string(),
            indexes: vec![],
        }
    }

    /// Users table
    pub fn users() -> TableDefinition {
        let table = UserIdType::PREFIX;
        TableDefinition {
            name: table.to_string(),
            schema: format!(
                r#"
                DEFINE TABLE {table} SCHEMAFULL;
                DEFINE FIELD full_name ON {table} TYPE string;
                DEFINE FIELD email ON {table} TYPE string;
                DEFINE FIELD password_hash ON {table} TYPE string;
                DEFINE FIELD bio ON {table} TYPE string DEFAULT '';
                DEFINE FIELD profile_pic ON {table} TYPE string DEFAULT '';
                DEFINE FIELD native_language ON {table} TYPE string DEFAULT '';
                DEFINE FIELD learning_language ON {table} TYPE string DEFAULT '';
                DEFINE FIELD location ON {table} TYPE string DEFAULT '';
                DEFINE FIELD is_onboarded ON {table} TYPE bool DEFAULT false;
                DEFINE FIELD friends ON {table} TYPE array<record<{table}>> DEFAULT [];
                DEFINE FIELD created_at ON {table} TYPE datetime;
                DEFINE FIELD updated_at ON {table} TYPE datetime;
            "#
            ),
            indexes: vec![
                format!("DEFINE INDEX {table}_email ON TABLE {table} FIELDS email UNIQUE"),
                format!("DEFINE INDEX {table}_onboarded ON TABLE {table} FIELDS is_onboarded"),
            ],
        }
    }

    /// Friend requests table
    pub fn friend_requests() -> TableDefinition {
        let table = FriendRequestIdType::PREFIX;
        let user = UserIdType::PREFIX;
        TableDefinition {
            name: table.to_string(),
            schema: format!(
                r#"
                DEFINE TABLE {table} SCHEMAFULL;
                DEFINE FIELD sender ON {table} TYPE record<{user}>;
                DEFINE FIELD recipient ON {table} TYPE record<{user}>;
                DEFINE FIELD status ON {table} TYPE string
                    ASSERT $value INSIDE ['pending', 'accepted'];
                DEFINE FIELD created_at ON {table} TYPE datetime;
                DEFINE FIELD updated_at ON {table} TYPE datetime;
            "#
            ),
            indexes: vec![
                format!(
                    "DEFINE INDEX {table}_pair ON TABLE {table} FIELDS sender, recipient UNIQUE"
                ),
                format!("DEFINE INDEX {table}_recipient ON TABLE {table} FIELDS recipient, status"),
                format!("DEFINE INDEX {table}_sender ON TABLE {table} FIELDS sender, status"),
            ],
        }
    }
}
