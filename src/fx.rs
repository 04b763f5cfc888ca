use serde::{Deserialize, Serialize};

use crate::mutate::MutationError;

/// Static description of one effect block on the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectInfo {
    pub name: String,
    /// Parameter key of the on/off switch, if the block can be bypassed
    pub enable_key: Option<String>,
    /// Parameter key of the algorithm/type selector
    pub type_key: Option<String>,
    /// Code of this block in the chain position list
    pub position: Option<u8>,
    /// True when the block's parameters depend on the selected type
    #[serde(default)]
    pub nested: bool,
}

impl EffectInfo {
    pub fn new(
        name: &str,
        enable_key: Option<&str>,
        type_key: Option<&str>,
        position: Option<u8>,
    ) -> Self {
        Self {
            name: name.to_string(),
            enable_key: enable_key.map(str::to_string),
            type_key: type_key.map(str::to_string),
            position,
            nested: false,
        }
    }

    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }
}

/// Immutable list of effect blocks, built once and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRegistry {
    effects: Vec<EffectInfo>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::gt100()
    }
}

impl EffectRegistry {
    pub fn new(effects: Vec<EffectInfo>) -> Self {
        Self { effects }
    }

    /// The effect blocks of a BOSS GT-100.
    pub fn gt100() -> Self {
        Self::new(vec![
            EffectInfo::new("COMP", Some("comp_on_off"), Some("comp_type"), Some(0)),
            EffectInfo::new("EQ", Some("eq_on_off"), None, Some(4)),
            EffectInfo::new("FX1", Some("fx1_on_off"), Some("fx1_fx_type"), Some(5)).nested(),
            EffectInfo::new("FX2", Some("fx2_on_off"), Some("fx2_fx_type"), Some(6)).nested(),
            EffectInfo::new("OD/DS", Some("od_ds_on_off"), Some("od_ds_type"), Some(15)),
            EffectInfo::new("DELAY", Some("delay_on_off"), Some("delay_type"), Some(7)),
            EffectInfo::new("PREAMP A", Some("preamp_a_on_off"), Some("preamp_a_type"), None),
            EffectInfo::new("PREAMP B", Some("preamp_b_on_off"), Some("preamp_b_type"), None),
            EffectInfo::new("REVERB", Some("reverb_on_off"), Some("reverb_type"), Some(9)),
            EffectInfo::new("CHORUS", Some("chorus_on_off"), Some("chorus_mode"), Some(8)),
            EffectInfo::new(
                "PEDAL FX",
                Some("pedal_fx_on_off"),
                Some("pedal_fx_wah_type"),
                Some(11),
            ),
            EffectInfo::new("ACCEL FX", None, None, Some(10)),
        ])
    }

    pub fn effects(&self) -> &[EffectInfo] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn by_name(&self, name: &str) -> Option<&EffectInfo> {
        self.effects.iter().find(|e| e.name == name)
    }

    /// Resolve the effects named in `include`, minus those in `ignore`.
    ///
    /// Registry order is preserved. Names are matched exactly, after
    /// trimming surrounding whitespace.
    pub fn select<S: AsRef<str>>(
        &self,
        include: &[S],
        ignore: &[S],
    ) -> Result<Vec<&EffectInfo>, MutationError> {
        for name in include.iter().chain(ignore) {
            let name = name.as_ref().trim();
            if self.by_name(name).is_none() {
                return Err(MutationError::UnknownEffect(name.to_string()));
            }
        }

        let wanted = |n: &str| include.iter().any(|i| i.as_ref().trim() == n);
        let ignored = |n: &str| ignore.iter().any(|i| i.as_ref().trim() == n);

        Ok(self
            .effects
            .iter()
            .filter(|e| wanted(e.name.as_str()) && !ignored(e.name.as_str()))
            .collect())
    }
}
