//! Account repository for FreshKart.
//!
//! CRUD plus the account-bound security operations: failed/successful login
//! bookkeeping, single-use token storage and consumption, password updates
//! and role administration. Every state transition that other requests could
//! race on is a single SQL statement.

use chrono::{DateTime, Duration, Utc};

use super::account::{encode_permissions, normalize_email, Account, AccountRow, NewAccount};
use super::{DbPool, Permission, Role};
use crate::clock::{from_millis, to_millis};
use crate::{FreshkartError, Result};

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, permissions, is_admin, status,
     email_verified, email_verification_token, email_verification_expires_at,
     reset_password_token, reset_password_expires_at, login_attempts, lock_until,
     last_login_at, last_login_ip, password_changed_at, is_active, created_at, updated_at";

/// Counter state after a failed login has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLogin {
    /// Failed attempts since the last reset.
    pub login_attempts: u32,
    /// Lock expiry, if a lock is set.
    pub lock_until: Option<DateTime<Utc>>,
}

impl FailedLogin {
    /// Whether the account is locked at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }
}

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// The email is normalized first. Returns `Duplicate` if an account with
    /// the same normalized email exists.
    pub async fn create(&self, new: &NewAccount, now: DateTime<Utc>) -> Result<Account> {
        let email = normalize_email(&new.email);
        let ts = to_millis(now);

        let result = sqlx::query(
            "INSERT INTO accounts (name, email, password_hash, role, permissions, is_admin,
                                   status, email_verified, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.name.trim())
        .bind(&email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(encode_permissions(&new.permissions))
        .bind(new.role == Role::Admin)
        .bind(new.status.as_str())
        .bind(new.email_verified)
        .bind(ts)
        .bind(ts)
        .execute(self.pool)
        .await
        .map_err(|e| match FreshkartError::from(e) {
            FreshkartError::Duplicate(_) => FreshkartError::Duplicate("account".to_string()),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FreshkartError::NotFound("account".to_string()))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Get an account by email (normalized before lookup).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Check whether an account with this email exists.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?)")
                .bind(normalize_email(email))
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Record a failed login attempt.
    ///
    /// An expired lock restarts the counter at 1 and clears the lock.
    /// Otherwise the counter is incremented and, once it reaches
    /// `max_attempts` on an account that is not currently locked, the
    /// account is locked until `now + lock_duration`.
    pub async fn record_failed_login(
        &self,
        id: i64,
        now: DateTime<Utc>,
        max_attempts: u32,
        lock_duration: Duration,
    ) -> Result<Option<FailedLogin>> {
        let now_ms = to_millis(now);
        let lock_until = to_millis(now + lock_duration);

        let row: Option<(i64, Option<i64>)> = sqlx::query_as(
            "UPDATE accounts SET
                login_attempts = CASE
                    WHEN lock_until IS NOT NULL AND lock_until <= ?1 THEN 1
                    ELSE login_attempts + 1
                END,
                lock_until = CASE
                    WHEN lock_until IS NOT NULL AND lock_until <= ?1 THEN NULL
                    WHEN lock_until IS NOT NULL THEN lock_until
                    WHEN login_attempts + 1 >= ?2 THEN ?3
                    ELSE NULL
                END,
                status = CASE
                    WHEN lock_until IS NOT NULL AND lock_until <= ?1 AND status = 'locked'
                        THEN CASE WHEN email_verified THEN 'active' ELSE 'pending_verification' END
                    WHEN lock_until IS NULL AND login_attempts + 1 >= ?2 THEN 'locked'
                    ELSE status
                END,
                updated_at = ?1
             WHERE id = ?4
             RETURNING login_attempts, lock_until",
        )
        .bind(now_ms)
        .bind(i64::from(max_attempts))
        .bind(lock_until)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(attempts, lock)| FailedLogin {
            login_attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
            lock_until: lock.map(from_millis),
        }))
    }

    /// Record a successful login: reset the counter, clear any lock, settle
    /// the status from the verification state and stamp the login source.
    pub async fn record_successful_login(
        &self,
        id: i64,
        now: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET
                login_attempts = 0,
                lock_until = NULL,
                status = CASE
                    WHEN status = 'suspended' THEN status
                    WHEN email_verified THEN 'active'
                    ELSE 'pending_verification'
                END,
                last_login_at = ?1,
                last_login_ip = ?2,
                updated_at = ?1
             WHERE id = ?3
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(to_millis(now))
            .bind(ip)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Store a verification token hash, replacing any outstanding one.
    pub async fn store_email_verification_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE accounts
             SET email_verification_token = ?, email_verification_expires_at = ?
             WHERE id = ?",
        )
        .bind(token_hash)
        .bind(to_millis(expires_at))
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume a verification token.
    ///
    /// Marks the matching account verified and clears the token. Returns
    /// `None` when no account holds this hash or it has expired.
    pub async fn consume_email_verification_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET
                email_verified = 1,
                status = CASE WHEN status = 'pending_verification' THEN 'active' ELSE status END,
                email_verification_token = NULL,
                email_verification_expires_at = NULL,
                updated_at = ?1
             WHERE email_verification_token = ?2 AND email_verification_expires_at > ?1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(to_millis(now))
            .bind(token_hash)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Store a reset token hash, replacing any outstanding one.
    pub async fn store_password_reset_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE accounts
             SET reset_password_token = ?, reset_password_expires_at = ?
             WHERE id = ?",
        )
        .bind(token_hash)
        .bind(to_millis(expires_at))
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop an outstanding reset token.
    pub async fn clear_password_reset_token(&self, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE accounts
             SET reset_password_token = NULL, reset_password_expires_at = NULL
             WHERE id = ?",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Consume a reset token and install a new password hash.
    ///
    /// If the account is locked at `now`, the lock and the counter are
    /// cleared and the status restored from the verification state.
    /// Returns `None` when no account holds this hash or it has expired.
    pub async fn consume_password_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET
                password_hash = ?3,
                password_changed_at = ?4,
                reset_password_token = NULL,
                reset_password_expires_at = NULL,
                login_attempts = CASE WHEN lock_until > ?1 THEN 0 ELSE login_attempts END,
                status = CASE
                    WHEN lock_until > ?1
                        THEN CASE WHEN email_verified THEN 'active' ELSE 'pending_verification' END
                    ELSE status
                END,
                lock_until = CASE WHEN lock_until > ?1 THEN NULL ELSE lock_until END,
                updated_at = ?1
             WHERE reset_password_token = ?2 AND reset_password_expires_at > ?1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(to_millis(now))
            .bind(token_hash)
            .bind(new_password_hash)
            .bind(to_millis(changed_at))
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Replace the password hash (authenticated change-password path).
    pub async fn update_password(
        &self,
        id: i64,
        new_password_hash: &str,
        now: DateTime<Utc>,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts
             SET password_hash = ?, password_changed_at = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(new_password_hash)
            .bind(to_millis(changed_at))
            .bind(to_millis(now))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Change an account's role and permission set.
    ///
    /// `is_admin` is written in the same statement.
    pub async fn update_role(
        &self,
        id: i64,
        role: Role,
        permissions: &[Permission],
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts
             SET role = ?, permissions = ?, is_admin = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(role.as_str())
            .bind(encode_permissions(permissions))
            .bind(role == Role::Admin)
            .bind(to_millis(now))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Promote an account to a verified, active administrator.
    pub async fn promote_to_admin(&self, id: i64, now: DateTime<Utc>) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts
             SET role = 'admin', permissions = '', is_admin = 1,
                 email_verified = 1, status = 'active', is_active = 1,
                 email_verification_token = NULL, email_verification_expires_at = NULL,
                 updated_at = ?
             WHERE id = ?
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(to_millis(now))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }

    /// Enable or disable an account.
    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET is_active = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(is_active)
            .bind(to_millis(now))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(into_account).transpose()
    }
}

fn into_account(row: AccountRow) -> Result<Account> {
    Account::try_from(row).map_err(FreshkartError::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AccountStatus, Database};

    const MAX: u32 = 5;

    fn t0() -> DateTime<Utc> {
        from_millis(1_700_000_000_000)
    }

    fn lock() -> Duration {
        Duration::minutes(15)
    }

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_alice(repo: &AccountRepository<'_>) -> Account {
        repo.create(&NewAccount::new("Alice", "Alice@Example.com", "hash"), t0())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let account = create_alice(&repo).await;
        assert_eq!(account.id, 1);
        assert_eq!(account.email, "alice@example.com");
        assert_eq!(account.role, Role::Buyer);
        assert_eq!(account.status, AccountStatus::PendingVerification);
        assert!(!account.email_verified);
        assert!(!account.is_admin);
        assert!(account.is_active);
        assert_eq!(account.login_attempts, 0);
        assert_eq!(account.created_at, t0());
    }

    #[tokio::test]
    async fn test_create_duplicate_email_case_insensitive() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        create_alice(&repo).await;

        let result = repo
            .create(&NewAccount::new("Other", " ALICE@example.COM ", "h"), t0())
            .await;
        assert!(matches!(result, Err(FreshkartError::Duplicate(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_email_normalizes() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        let found = repo.get_by_email("  ALICE@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(repo.email_exists("alice@example.com").await.unwrap());
        assert!(!repo.email_exists("bob@example.com").await.unwrap());
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_logins_lock_at_threshold() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        for expected in 1..MAX {
            let state = repo
                .record_failed_login(alice.id, t0(), MAX, lock())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(state.login_attempts, expected);
            assert!(!state.is_locked(t0()));
        }

        let state = repo
            .record_failed_login(alice.id, t0(), MAX, lock())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.login_attempts, MAX);
        assert_eq!(state.lock_until, Some(t0() + lock()));

        let stored = repo.get_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Locked);
        assert!(stored.is_locked(t0()));
    }

    #[tokio::test]
    async fn test_failed_login_while_locked_keeps_lock_expiry() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        for _ in 0..MAX {
            repo.record_failed_login(alice.id, t0(), MAX, lock())
                .await
                .unwrap();
        }
        let later = t0() + Duration::minutes(5);
        let state = repo
            .record_failed_login(alice.id, later, MAX, lock())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.login_attempts, MAX + 1);
        assert_eq!(state.lock_until, Some(t0() + lock()));
    }

    #[tokio::test]
    async fn test_failed_login_after_expired_lock_restarts_at_one() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        for _ in 0..MAX {
            repo.record_failed_login(alice.id, t0(), MAX, lock())
                .await
                .unwrap();
        }

        let after = t0() + Duration::minutes(16);
        let state = repo
            .record_failed_login(alice.id, after, MAX, lock())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.login_attempts, 1);
        assert!(state.lock_until.is_none());

        let stored = repo.get_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::PendingVerification);
    }

    #[tokio::test]
    async fn test_record_failed_login_unknown_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let state = repo.record_failed_login(42, t0(), MAX, lock()).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_successful_login_resets_counter() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        for _ in 0..3 {
            repo.record_failed_login(alice.id, t0(), MAX, lock())
                .await
                .unwrap();
        }
        let account = repo
            .record_successful_login(alice.id, t0(), Some("10.0.0.1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.login_attempts, 0);
        assert!(account.lock_until.is_none());
        assert_eq!(account.status, AccountStatus::PendingVerification);
        assert_eq!(account.last_login_at, Some(t0()));
        assert_eq!(account.last_login_ip.as_deref(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_verification_token_consumed_once() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        repo.store_email_verification_token(alice.id, "hash-a", t0() + Duration::hours(24))
            .await
            .unwrap();

        let verified = repo
            .consume_email_verification_token("hash-a", t0())
            .await
            .unwrap()
            .unwrap();
        assert!(verified.email_verified);
        assert_eq!(verified.status, AccountStatus::Active);
        assert!(verified.email_verification_token.is_none());

        let again = repo
            .consume_email_verification_token("hash-a", t0())
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_verification_token_reissue_overwrites() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;
        let expires = t0() + Duration::hours(24);

        repo.store_email_verification_token(alice.id, "first", expires)
            .await
            .unwrap();
        repo.store_email_verification_token(alice.id, "second", expires)
            .await
            .unwrap();

        assert!(repo
            .consume_email_verification_token("first", t0())
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .consume_email_verification_token("second", t0())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_verification_token_expired() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;
        let expires = t0() + Duration::hours(24);

        repo.store_email_verification_token(alice.id, "hash", expires)
            .await
            .unwrap();
        assert!(repo
            .consume_email_verification_token("hash", expires)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reset_token_clears_active_lock() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        for _ in 0..MAX {
            repo.record_failed_login(alice.id, t0(), MAX, lock())
                .await
                .unwrap();
        }
        repo.store_password_reset_token(alice.id, "reset", t0() + Duration::minutes(10))
            .await
            .unwrap();

        let now = t0() + Duration::minutes(1);
        let account = repo
            .consume_password_reset_token("reset", "new-hash", now, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.password_hash, "new-hash");
        assert_eq!(account.login_attempts, 0);
        assert!(account.lock_until.is_none());
        assert_eq!(account.status, AccountStatus::PendingVerification);
        assert_eq!(account.password_changed_at, Some(now));
        assert!(account.reset_password_token.is_none());

        assert!(repo
            .consume_password_reset_token("reset", "other", now, now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reset_token_expired() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        repo.store_password_reset_token(alice.id, "reset", t0() + Duration::minutes(10))
            .await
            .unwrap();
        let late = t0() + Duration::minutes(11);
        assert!(repo
            .consume_password_reset_token("reset", "new-hash", late, late)
            .await
            .unwrap()
            .is_none());

        let stored = repo.get_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_update_role_keeps_admin_flag_in_sync() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        let admin = repo
            .update_role(alice.id, Role::Admin, &[], t0())
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin);

        let seller = repo
            .update_role(alice.id, Role::Seller, &Role::Seller.default_permissions(), t0())
            .await
            .unwrap()
            .unwrap();
        assert!(!seller.is_admin);
        assert_eq!(seller.permissions.len(), 3);
    }

    #[tokio::test]
    async fn test_promote_to_admin() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        let admin = repo.promote_to_admin(alice.id, t0()).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.is_admin);
        assert!(admin.email_verified);
        assert_eq!(admin.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_set_active() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        let account = repo.set_active(alice.id, false, t0()).await.unwrap().unwrap();
        assert!(!account.is_active);
        assert!(repo.set_active(999, false, t0()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let alice = create_alice(&repo).await;

        let changed_at = t0() - Duration::seconds(1);
        let account = repo
            .update_password(alice.id, "new-hash", t0(), changed_at)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.password_hash, "new-hash");
        assert_eq!(account.password_changed_at, Some(changed_at));
    }
}
