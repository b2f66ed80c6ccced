pub mod test_helpers {
    use crate::models::CompanyRole;
    use crate::services::AuthService;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must see the same data
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    pub async fn insert_test_company(pool: &SqlitePool, name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO companies (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_profile(
        pool: &SqlitePool,
        email: &str,
        company_id: Option<i64>,
        role: CompanyRole,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO profiles (email, company_id, company_role) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(company_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Store a session for `profile_id` and return the raw bearer token.
    pub async fn insert_test_session(
        pool: &SqlitePool,
        profile_id: i64,
        expires_at: i64,
    ) -> Result<String, sqlx::Error> {
        let token = format!("test-token-{}", uuid::Uuid::new_v4());
        sqlx::query("INSERT INTO api_sessions (token_hash, profile_id, expires_at) VALUES (?, ?, ?)")
            .bind(AuthService::hash_token(&token))
            .bind(profile_id)
            .bind(expires_at)
            .execute(pool)
            .await?;

        Ok(token)
    }

    /// Company with one admin and one member, each holding a live session.
    pub struct TestTenant {
        pub company_id: i64,
        pub admin_id: i64,
        pub admin_token: String,
        pub member_id: i64,
        pub member_token: String,
    }

    pub async fn create_test_tenant(pool: &SqlitePool, name: &str) -> Result<TestTenant, sqlx::Error> {
        let company_id = insert_test_company(pool, name).await?;
        let slug = name.to_ascii_lowercase().replace(' ', "-");
        let expires_at = chrono::Utc::now().timestamp() + 3600;

        let admin_id = insert_test_profile(
            pool,
            &format!("admin@{}.test", slug),
            Some(company_id),
            CompanyRole::Admin,
        )
        .await?;
        let member_id = insert_test_profile(
            pool,
            &format!("member@{}.test", slug),
            Some(company_id),
            CompanyRole::Member,
        )
        .await?;

        Ok(TestTenant {
            company_id,
            admin_id,
            admin_token: insert_test_session(pool, admin_id, expires_at).await?,
            member_id,
            member_token: insert_test_session(pool, member_id, expires_at).await?,
        })
    }
}

/// In-memory stand-ins for the upstream verification services.
pub mod fakes {
    use crate::models::DnsRecord;
    use crate::services::{
        CreatedDomain, CreatedSender, DomainCheck, DomainGateway, GatewayError, SenderGateway,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Accepts `valid_otp` for every sender it created. Set `fail_create`
    /// to make the next creations fail upstream.
    pub struct FakeSenderGateway {
        pub valid_otp: String,
        pub fail_create: AtomicBool,
        pub not_configured: AtomicBool,
        next_id: AtomicUsize,
        created: Mutex<Vec<(String, String)>>,
        validated: Mutex<Vec<String>>,
    }

    impl FakeSenderGateway {
        pub fn new(valid_otp: &str) -> Self {
            Self {
                valid_otp: valid_otp.to_string(),
                fail_create: AtomicBool::new(false),
                not_configured: AtomicBool::new(false),
                next_id: AtomicUsize::new(1),
                created: Mutex::new(Vec::new()),
                validated: Mutex::new(Vec::new()),
            }
        }

        /// `(id, email)` of every sender created so far.
        pub fn created(&self) -> Vec<(String, String)> {
            self.created.lock().map(|c| c.clone()).unwrap_or_default()
        }

        pub fn validated(&self) -> Vec<String> {
            self.validated.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl SenderGateway for FakeSenderGateway {
        async fn create_sender(&self, email: &str, _name: &str) -> Result<CreatedSender, GatewayError> {
            if self.not_configured.load(Ordering::SeqCst) {
                return Err(GatewayError::NotConfigured("sender"));
            }
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(GatewayError::Rejected {
                    status: 400,
                    message: "sender rejected".to_string(),
                });
            }

            let id = format!("snd-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            if let Ok(mut created) = self.created.lock() {
                created.push((id.clone(), email.to_string()));
            }
            Ok(CreatedSender {
                id,
                spf_error: false,
                dkim_error: false,
            })
        }

        async fn validate_otp(&self, code: &str, sender_id: &str) -> Result<(), GatewayError> {
            if self.not_configured.load(Ordering::SeqCst) {
                return Err(GatewayError::NotConfigured("sender"));
            }
            let known = self.created().iter().any(|(id, _)| id == sender_id);
            if !known || code != self.valid_otp {
                return Err(GatewayError::InvalidCode);
            }
            if let Ok(mut validated) = self.validated.lock() {
                validated.push(sender_id.to_string());
            }
            Ok(())
        }
    }

    /// Domains become authenticated once [`FakeDomainGateway::publish_dns`]
    /// was called for them and `authenticate_domain` ran afterwards.
    #[derive(Default)]
    pub struct FakeDomainGateway {
        pub fail_validate: AtomicBool,
        pub not_configured: AtomicBool,
        domains: Mutex<HashMap<String, DomainEntry>>,
    }

    #[derive(Default, Clone)]
    struct DomainEntry {
        dns_published: bool,
        authenticated: bool,
    }

    impl FakeDomainGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn publish_dns(&self, domain: &str) {
            if let Ok(mut domains) = self.domains.lock() {
                domains.entry(domain.to_string()).or_default().dns_published = true;
            }
        }

        pub fn registered(&self, domain: &str) -> bool {
            self.domains
                .lock()
                .map(|d| d.contains_key(domain))
                .unwrap_or(false)
        }

        fn records(published: bool) -> Vec<DnsRecord> {
            vec![
                DnsRecord {
                    name: "brevo_code".to_string(),
                    record_type: "TXT".to_string(),
                    host_name: "@".to_string(),
                    value: "brevo-code:fake".to_string(),
                    status: published,
                },
                DnsRecord {
                    name: "dkim_record".to_string(),
                    record_type: "TXT".to_string(),
                    host_name: "mail._domainkey".to_string(),
                    value: "k=rsa;p=fake".to_string(),
                    status: published,
                },
            ]
        }

        fn check_configured(&self) -> Result<(), GatewayError> {
            if self.not_configured.load(Ordering::SeqCst) {
                Err(GatewayError::NotConfigured("Brevo"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DomainGateway for FakeDomainGateway {
        async fn create_domain(&self, name: &str) -> Result<CreatedDomain, GatewayError> {
            self.check_configured()?;
            let mut domains = self
                .domains
                .lock()
                .map_err(|_| GatewayError::Decode("poisoned".to_string()))?;
            let entry = domains.entry(name.to_string()).or_default();
            Ok(CreatedDomain {
                id: Some(format!("dom-{}", name)),
                dns_records: Self::records(entry.dns_published),
            })
        }

        async fn validate_domain(&self, name: &str) -> Result<DomainCheck, GatewayError> {
            self.check_configured()?;
            if self.fail_validate.load(Ordering::SeqCst) {
                return Err(GatewayError::Rejected {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            let domains = self
                .domains
                .lock()
                .map_err(|_| GatewayError::Decode("poisoned".to_string()))?;
            let entry = domains.get(name).ok_or_else(|| GatewayError::Rejected {
                status: 404,
                message: "Domain does not exist".to_string(),
            })?;
            Ok(DomainCheck {
                verified: entry.dns_published,
                authenticated: entry.authenticated,
                dns_records: Self::records(entry.dns_published),
            })
        }

        async fn authenticate_domain(&self, name: &str) -> Result<String, GatewayError> {
            self.check_configured()?;
            let mut domains = self
                .domains
                .lock()
                .map_err(|_| GatewayError::Decode("poisoned".to_string()))?;
            let entry = domains.get_mut(name).ok_or_else(|| GatewayError::Rejected {
                status: 404,
                message: "Domain does not exist".to_string(),
            })?;
            if entry.dns_published {
                entry.authenticated = true;
                Ok("Domain has been authenticated successfully.".to_string())
            } else {
                Ok("Authentication requested; DNS records not found yet.".to_string())
            }
        }
    }
}
