use config::ConfigError;

/// Minimum acceptable bcrypt work factor. Lower configured values are
/// clamped up to this.
pub const MIN_BCRYPT_COST: u32 = 10;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token-signing settings.
///
/// Both secrets are required: a missing secret is a `get_configuration`
/// failure at process start, never a per-request error. Access and refresh
/// tokens are signed with distinct secrets so compromise of one does not
/// compromise the other.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64, // seconds
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64, // seconds
}

fn default_access_expiry() -> i64 {
    3600
}

fn default_refresh_expiry() -> i64 {
    604_800
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl PasswordSettings {
    pub fn effective_cost(&self) -> u32 {
        self.bcrypt_cost.max(MIN_BCRYPT_COST)
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_bcrypt_cost_is_clamped() {
        let settings = PasswordSettings { bcrypt_cost: 4 };
        assert_eq!(settings.effective_cost(), MIN_BCRYPT_COST);
    }

    #[test]
    fn test_default_cost_is_kept() {
        let settings = PasswordSettings::default();
        assert_eq!(settings.effective_cost(), bcrypt::DEFAULT_COST);
    }
}
