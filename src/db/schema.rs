//! Database schema and migrations for FreshKart.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded. All timestamps are INTEGER Unix milliseconds.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: accounts
    r#"
CREATE TABLE accounts (
    id                              INTEGER PRIMARY KEY AUTOINCREMENT,
    name                            TEXT NOT NULL,
    email                           TEXT NOT NULL UNIQUE,
    password_hash                   TEXT NOT NULL,
    role                            TEXT NOT NULL DEFAULT 'buyer'
                                    CHECK (role IN ('buyer', 'seller', 'moderator', 'admin')),
    permissions                     TEXT NOT NULL DEFAULT '',  -- comma-separated
    is_admin                        INTEGER NOT NULL DEFAULT 0,
    status                          TEXT NOT NULL DEFAULT 'pending_verification'
                                    CHECK (status IN ('pending_verification', 'active', 'suspended', 'locked')),
    email_verified                  INTEGER NOT NULL DEFAULT 0,
    email_verification_token        TEXT,     -- SHA-256 hex
    email_verification_expires_at   INTEGER,
    reset_password_token            TEXT,     -- SHA-256 hex
    reset_password_expires_at       INTEGER,
    login_attempts                  INTEGER NOT NULL DEFAULT 0 CHECK (login_attempts >= 0),
    lock_until                      INTEGER,
    last_login_at                   INTEGER,
    last_login_ip                   TEXT,
    password_changed_at             INTEGER,
    is_active                       INTEGER NOT NULL DEFAULT 1,
    created_at                      INTEGER NOT NULL,
    updated_at                      INTEGER NOT NULL,
    CHECK (is_admin = (role = 'admin'))
);

CREATE INDEX idx_accounts_role ON accounts(role);
CREATE INDEX idx_accounts_verification_token ON accounts(email_verification_token);
CREATE INDEX idx_accounts_reset_token ON accounts(reset_password_token);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_accounts_migration_enforces_admin_flag() {
        assert!(MIGRATIONS[0].contains("CHECK (is_admin = (role = 'admin'))"));
    }
}
