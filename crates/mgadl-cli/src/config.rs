use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mgadl_sheets::append::{DEFAULT_WORKSHEET_NAME, SheetTarget};
use mgadl_sheets::google::ServiceAccountKey;
use mgadl_wizard::controller::WizardSettings;

/// Current secrets-file version. Bump this when adding fields or changing
/// shape. Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Gate password used when none is configured.
pub const DEFAULT_APP_PASSWORD: &str = "0712";

/// Names of the recognized options, both as secrets-file keys and as
/// environment variables.
pub mod key {
    pub const APP_PASSWORD: &str = "APP_PASSWORD";
    pub const SHEET_ID: &str = "SHEET_ID";
    pub const WORKSHEET_NAME: &str = "WORKSHEET_NAME";
    pub const SALT: &str = "SALT";
    pub const GOOGLE_SERVICE_ACCOUNT: &str = "GOOGLE_SERVICE_ACCOUNT";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Schema version. Missing or 0 = pre-versioned file.
    #[serde(default)]
    pub config_version: u32,
    #[serde(rename = "APP_PASSWORD", default = "default_app_password")]
    pub app_password: String,
    #[serde(rename = "SHEET_ID", default)]
    pub sheet_id: String,
    #[serde(rename = "WORKSHEET_NAME", default = "default_worksheet_name")]
    pub worksheet_name: String,
    #[serde(rename = "SALT", default)]
    pub salt: String,
    #[serde(
        rename = "GOOGLE_SERVICE_ACCOUNT",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub google_service_account: Option<ServiceAccountKey>,
}

fn default_app_password() -> String {
    DEFAULT_APP_PASSWORD.to_string()
}

fn default_worksheet_name() -> String {
    DEFAULT_WORKSHEET_NAME.to_string()
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            app_password: default_app_password(),
            sheet_id: String::new(),
            worksheet_name: default_worksheet_name(),
            salt: String::new(),
            google_service_account: None,
        }
    }
}

impl SurveyConfig {
    pub fn target(&self) -> SheetTarget {
        SheetTarget::new(self.sheet_id.clone(), self.worksheet_name.clone())
    }

    pub fn wizard_settings(&self) -> WizardSettings {
        WizardSettings {
            app_password: self.app_password.clone(),
            salt: self.salt.clone(),
            target: self.target(),
        }
    }
}

/// Redacted view of the configuration, safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatus {
    pub sheet_id_configured: bool,
    pub service_account_configured: bool,
    pub worksheet_name: String,
    pub client_email: Option<String>,
}

pub fn integration_status(config: &SurveyConfig) -> IntegrationStatus {
    IntegrationStatus {
        sheet_id_configured: !config.sheet_id.trim().is_empty(),
        service_account_configured: config.google_service_account.is_some(),
        worksheet_name: config.worksheet_name.clone(),
        client_email: config
            .google_service_account
            .as_ref()
            .map(|k| k.client_email.clone()),
    }
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.mgadl.survey"))
}

pub fn default_secrets_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("secrets.json"))
}

/// Defaults, then the secrets file at `path` (or the default location) if it
/// exists, then environment variables.
pub fn load(path: Option<&Path>) -> eyre::Result<SurveyConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_secrets_path()?,
    };

    let config = if path.exists() {
        load_file(&path)?
    } else {
        tracing::debug!(path = %path.display(), "no secrets file, using defaults");
        SurveyConfig::default()
    };

    apply_env(config, |name| std::env::var(name).ok())
}

pub fn load_file(path: &Path) -> eyre::Result<SurveyConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read secrets at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    let config: SurveyConfig = serde_json::from_value(migrated)?;

    if on_disk_version < CURRENT_VERSION {
        save_file(path, &config)?;
    }
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        ));
    }

    // v0 → v1: the service account may be stored as a JSON string (the way it
    // is passed through the environment); store it as an object.
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("secrets file is not a JSON object"))?;
        if let Some(serde_json::Value::String(raw)) = obj.get(key::GOOGLE_SERVICE_ACCOUNT) {
            let parsed: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                eyre::eyre!("{} is not valid JSON: {e}", key::GOOGLE_SERVICE_ACCOUNT)
            })?;
            obj.insert(key::GOOGLE_SERVICE_ACCOUNT.to_string(), parsed);
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated secrets v0 → v1");
    }

    Ok(json)
}

/// Override fields from environment-style lookups. Empty values are ignored.
pub fn apply_env(
    mut config: SurveyConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> eyre::Result<SurveyConfig> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(key::APP_PASSWORD) {
        config.app_password = v;
    }
    if let Some(v) = get(key::SHEET_ID) {
        config.sheet_id = v;
    }
    if let Some(v) = get(key::WORKSHEET_NAME) {
        config.worksheet_name = v;
    }
    if let Some(v) = get(key::SALT) {
        config.salt = v;
    }
    if let Some(v) = get(key::GOOGLE_SERVICE_ACCOUNT) {
        let parsed = ServiceAccountKey::from_json(&v).map_err(|e| {
            eyre::eyre!(
                "{} is not a service account key: {e}",
                key::GOOGLE_SERVICE_ACCOUNT
            )
        })?;
        config.google_service_account = Some(parsed);
    }
    Ok(config)
}

pub fn save_file(path: &Path, config: &SurveyConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("secrets path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "secrets saved");
    Ok(())
}
