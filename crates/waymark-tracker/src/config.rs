/// Registry settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackerConfig {
    /// Worker threads searches run on.
    pub max_threads: usize,
    /// Whether [`Tracker::start`](crate::Tracker::start) initializes every
    /// registered graph.
    pub initialize_on_start: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_threads: 5,
            initialize_on_start: true,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: TrackerConfig = serde_json::from_str(r#"{ "max_threads": 2 }"#).unwrap();
        assert_eq!(cfg.max_threads, 2);
        assert!(cfg.initialize_on_start);
    }
}
