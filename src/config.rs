use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Factors for the emissions/cost estimation. Emission factors are
/// kg CO2e per km, costs are NOK per km.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimationConfig {
    /// Per-person transit factor; bus-like service assumed.
    pub transit_emissions_per_km: f64,
    /// Fleet-average drive factor, used when the user has no default vehicle.
    pub average_drive_emissions_per_km: f64,
    pub drive_cost_nok_per_km: f64,
    pub transit_cost_nok_per_km: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            transit_emissions_per_km: 0.089,
            average_drive_emissions_per_km: 0.118,
            drive_cost_nok_per_km: 2.0,
            transit_cost_nok_per_km: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub routing: RoutingConfig,
    pub estimation: EstimationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "greentrip".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "greentrip-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let routing = RoutingConfig {
            base_url: std::env::var("ROUTING_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com".into()),
            api_key: std::env::var("ROUTING_API_KEY")?,
            timeout_secs: std::env::var("ROUTING_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let defaults = EstimationConfig::default();
        let estimation = EstimationConfig {
            transit_emissions_per_km: env_f64(
                "TRANSIT_EMISSIONS_PER_KM",
                defaults.transit_emissions_per_km,
            ),
            average_drive_emissions_per_km: env_f64(
                "AVERAGE_DRIVE_EMISSIONS_PER_KM",
                defaults.average_drive_emissions_per_km,
            ),
            drive_cost_nok_per_km: env_f64("DRIVE_COST_NOK_PER_KM", defaults.drive_cost_nok_per_km),
            transit_cost_nok_per_km: env_f64(
                "TRANSIT_COST_NOK_PER_KM",
                defaults.transit_cost_nok_per_km,
            ),
        };
        Ok(Self {
            database_url,
            jwt,
            routing,
            estimation,
        })
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}
