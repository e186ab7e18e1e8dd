use anyhow::{bail, Result};
use std::collections::BTreeMap;
use voyage_core::Constants;

const VALID_KEYS: &[&str] = &[
    "base_speed",
    "fuel_burn_per_tick",
    "low_fuel_fraction",
    "power_regen_base",
    "low_power_ratio",
    "thrust_boost_floor",
    "first_disaster_at_secs",
    "disaster_refire_min_secs",
    "disaster_refire_max_secs",
    "power_surge_drain",
    "weapon_power_cost",
    "weapon_hit_cooldown_secs",
    "weapon_miss_cooldown_secs",
    "hazard_impact_base_secs",
    "hazard_impact_spread_secs",
    "hazard_base_damage",
    "fuel_per_mixture",
    "fuel_target_period_secs",
    "manual_alert_effect_interval_secs",
];

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &BTreeMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "base_speed" => constants.base_speed = as_f64(key, value)?,
            "fuel_burn_per_tick" => constants.fuel_burn_per_tick = as_f64(key, value)?,
            "low_fuel_fraction" => constants.low_fuel_fraction = as_f64(key, value)?,
            "power_regen_base" => constants.power_regen_base = as_f64(key, value)?,
            "low_power_ratio" => constants.low_power_ratio = as_f64(key, value)?,
            "thrust_boost_floor" => constants.thrust_boost_floor = as_f64(key, value)?,
            "first_disaster_at_secs" => constants.first_disaster_at_secs = as_u64(key, value)?,
            "disaster_refire_min_secs" => {
                constants.disaster_refire_min_secs = as_u64(key, value)?;
            }
            "disaster_refire_max_secs" => {
                constants.disaster_refire_max_secs = as_u64(key, value)?;
            }
            "power_surge_drain" => constants.power_surge_drain = as_f64(key, value)?,
            "weapon_power_cost" => constants.weapon_power_cost = as_f64(key, value)?,
            "weapon_hit_cooldown_secs" => {
                constants.weapon_hit_cooldown_secs = as_f64(key, value)?;
            }
            "weapon_miss_cooldown_secs" => {
                constants.weapon_miss_cooldown_secs = as_f64(key, value)?;
            }
            "hazard_impact_base_secs" => constants.hazard_impact_base_secs = as_f64(key, value)?,
            "hazard_impact_spread_secs" => {
                constants.hazard_impact_spread_secs = as_f64(key, value)?;
            }
            "hazard_base_damage" => constants.hazard_base_damage = as_f64(key, value)?,
            "fuel_per_mixture" => constants.fuel_per_mixture = as_f64(key, value)?,
            "fuel_target_period_secs" => constants.fuel_target_period_secs = as_u64(key, value)?,
            "manual_alert_effect_interval_secs" => {
                constants.manual_alert_effect_interval_secs = as_u64(key, value)?;
            }
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }

    if constants.disaster_refire_min_secs > constants.disaster_refire_max_secs {
        bail!(
            "overrides leave an inverted disaster refire window: {}..{}",
            constants.disaster_refire_min_secs,
            constants.disaster_refire_max_secs
        );
    }
    if constants.fuel_target_period_secs == 0 {
        bail!("override 'fuel_target_period_secs' must be > 0");
    }
    Ok(())
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })
}
