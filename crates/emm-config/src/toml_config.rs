//! TOML configuration loader, DTO-then-patch shape mirroring the reference stack's
//! `tetra_config::toml_config`: unknown top-level keys are rejected via `#[serde(flatten)]`
//! catch-alls, defaults are supplied through `#[serde(default = "...")]`, and the parsed DTO is
//! applied onto an `MmeConfig` built from required fields.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use emm_core::identity::{Gummei, Plmn};

use crate::mme_config::{GummeiConfig, MmeConfig, MmeState};
use crate::shared::SharedConfig;

pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    let expected_config_version = "1.0";
    if root.config_version != expected_config_version {
        return Err(format!(
            "unrecognized config_version: {}, expected {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if !root.gummei.extra.is_empty() {
        return Err(format!("unrecognized fields in gummei: {:?}", sorted_keys(&root.gummei.extra)).into());
    }
    if let Some(ref feat) = root.features {
        if !feat.extra.is_empty() {
            return Err(format!("unrecognized fields in features: {:?}", sorted_keys(&feat.extra)).into());
        }
    }

    let plmn = Plmn { mcc: root.gummei.mcc, mnc: root.gummei.mnc, mnc_length: root.gummei.mnc_length };
    let mut cfg = MmeConfig::new(GummeiConfig {
        gummei: Gummei { plmn, mme_gid: root.gummei.mme_gid, mme_code: root.gummei.mme_code },
        tac_list: root.gummei.tac_list,
    });

    if let Some(feat) = root.features {
        apply_features_patch(&mut cfg, feat);
    }
    if let Some(t3450) = root.t3450_secs {
        cfg.t3450_secs = t3450;
    }
    if let Some(max_retrans) = root.attach_counter_max {
        cfg.attach_counter_max = max_retrans;
    }
    if let Some(max_ctx) = root.max_contexts {
        cfg.max_contexts = max_ctx;
    }

    let state = MmeState::default();

    cfg.validate().map_err(|e| format!("invalid configuration: {e}"))?;
    Ok(SharedConfig::from_parts(cfg, state))
}

pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    BufReader::new(reader).read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

fn apply_features_patch(cfg: &mut MmeConfig, feat: FeaturesDto) {
    if let Some(v) = feat.emergency_attach {
        cfg.emergency_attach = v;
    }
    if let Some(v) = feat.unauthenticated_imsi {
        cfg.unauthenticated_imsi = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,

    gummei: GummeiDto,

    #[serde(default)]
    features: Option<FeaturesDto>,

    t3450_secs: Option<u64>,
    attach_counter_max: Option<u8>,
    max_contexts: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct GummeiDto {
    mcc: u16,
    mnc: u16,
    mnc_length: u8,
    mme_gid: u16,
    mme_code: u8,
    tac_list: Vec<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct FeaturesDto {
    emergency_attach: Option<bool>,
    unauthenticated_imsi: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        config_version = "1.0"

        [gummei]
        mcc = 208
        mnc = 93
        mnc_length = 2
        mme_gid = 1
        mme_code = 1
        tac_list = [1, 2, 3]

        [features]
        emergency_attach = true
    "#;

    #[test]
    fn parses_minimal_config() {
        let shared = from_toml_str(SAMPLE).expect("should parse");
        let cfg = shared.config();
        assert_eq!(cfg.plmn().mcc, 208);
        assert!(cfg.emergency_attach);
        assert!(!cfg.unauthenticated_imsi);
        assert_eq!(cfg.t3450_secs, emm_core::T3450_DEFAULT_SECS);
    }

    #[test]
    fn rejects_unknown_top_level_field() {
        let toml_str = format!("{SAMPLE}\nbogus = 1\n");
        assert!(from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn rejects_wrong_config_version() {
        let toml_str = SAMPLE.replace("1.0", "0.1");
        assert!(from_toml_str(&toml_str).is_err());
    }
}
