use anyhow::{Context, Result};

/// Demo configuration.
///
/// Defaults mirror the quad demo: a 320x180 native canvas.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Native canvas width, used by the orthographic projection.
    pub native_width: u32,
    /// Native canvas height.
    pub native_height: u32,
    /// Number of update/write iterations to run.
    pub frames: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            native_width: 320,
            native_height: 180,
            frames: 120,
        }
    }
}

impl DemoConfig {
    /// Defaults overridden by `LUMEN_WIDTH`, `LUMEN_HEIGHT` and `LUMEN_FRAMES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        let fields: [(&str, &mut u32); 3] = [
            ("LUMEN_WIDTH", &mut config.native_width),
            ("LUMEN_HEIGHT", &mut config.native_height),
            ("LUMEN_FRAMES", &mut config.frames),
        ];
        for (key, slot) in fields {
            if let Some(raw) = lookup(key) {
                *slot = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid {key}: {raw:?}"))?;
            }
        }

        anyhow::ensure!(
            config.native_width > 0 && config.native_height > 0,
            "native canvas has zero size"
        );

        Ok(config)
    }
}
