use anyhow::{Result, anyhow};

/// Runtime configuration beyond the database settings. Chart dimensions are
/// tunable so operators can size the stats page renders.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Ok(Self {
            chart_width: env_dimension("CHART_WIDTH", 640)?,
            chart_height: env_dimension("CHART_HEIGHT", 420)?,
        })
    }
}

fn env_dimension(key: &str, default: u32) -> Result<u32> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid {key}: {raw}"))?;
    if !(160..=4096).contains(&value) {
        return Err(anyhow!("{key} must be between 160 and 4096"));
    }
    Ok(value)
}
