//! Alert reconciliation.
//!
//! Automatic alerts are recomputed from scratch every tick. Each condition
//! family yields at most one alert, keyed by a stable id; the previous tick's
//! map is consulted only to keep `first_seen_at` for ongoing conditions.
//! Manual alerts are authored by players and never touched by [`recompute`].

use std::collections::BTreeMap;

use crate::penalty::penalty_for;
use crate::{
    emit, Alert, AlertBoard, AlertId, AlertOrigin, AlertSeverity, Constants, EngineeringState,
    Event, EventEnvelope, GameClock, GameState, GaugeKind, Hazard, NavigationState, Player,
    ShipState, ShipSystem, SystemEffect,
};

const HULL_RESOLVED_BELOW: f64 = 20.0;
const OXYGEN_RESOLVED_ABOVE: f64 = 80.0;

/// Read-only view the reconciler evaluates.
pub struct AlertContext<'a> {
    pub ship: &'a ShipState,
    pub hazards: &'a [Hazard],
    pub navigation: &'a NavigationState,
    pub engineering: Option<&'a EngineeringState>,
    pub player: Player,
    pub now: GameClock,
}

impl<'a> AlertContext<'a> {
    pub fn from_state(state: &'a GameState) -> Self {
        Self {
            ship: &state.ship,
            hazards: &state.hazards,
            navigation: &state.navigation,
            engineering: Some(&state.engineering),
            player: state.active_player(),
            now: state.clock,
        }
    }
}

struct Condition {
    id: String,
    name: String,
    severity: AlertSeverity,
    description: String,
}

impl Condition {
    fn new(id: &str, name: &str, severity: AlertSeverity, description: String) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            severity,
            description,
        }
    }
}

fn hazard_condition(ctx: &AlertContext<'_>, c: &Constants) -> Option<Condition> {
    let now = ctx.now.total_seconds();
    let nearest = ctx
        .hazards
        .iter()
        .map(|h| crate::hazards::seconds_to_impact(h, now))
        .min()?;
    let tracked = ctx.hazards.len();
    let description = format!("Nearest impact in {nearest}s, {tracked} tracked");
    Some(if nearest <= c.hazard_imminent_secs {
        Condition::new(
            "asteroid-imminent",
            "Asteroid Impact Imminent",
            AlertSeverity::Critical,
            description,
        )
    } else if nearest <= c.hazard_nearby_secs {
        Condition::new(
            "asteroids-nearby",
            "Asteroids Nearby",
            AlertSeverity::Danger,
            description,
        )
    } else {
        Condition::new(
            "asteroids-incoming",
            "Asteroids Incoming",
            AlertSeverity::Warning,
            description,
        )
    })
}

fn fuel_condition(ctx: &AlertContext<'_>, c: &Constants) -> Option<Condition> {
    let pct = ctx.ship.fuel.percent();
    let description = format!("Fuel at {pct:.0}%");
    if pct <= c.fuel_alert_critical_pct {
        Some(Condition::new(
            "fuel-empty",
            "Fuel Depleted",
            AlertSeverity::Critical,
            description,
        ))
    } else if pct <= c.fuel_alert_danger_pct {
        Some(Condition::new(
            "fuel-critical",
            "Fuel Critical",
            AlertSeverity::Danger,
            description,
        ))
    } else if pct <= c.fuel_alert_warning_pct {
        Some(Condition::new(
            "fuel-low",
            "Fuel Low",
            AlertSeverity::Warning,
            description,
        ))
    } else {
        None
    }
}

fn navigation_condition(ctx: &AlertContext<'_>, c: &Constants) -> Option<Condition> {
    let errors = ctx.navigation.errors_against_either(c.alert_nav_tolerance);
    let description = format!("{errors} axes off course");
    match errors {
        0 => None,
        1 => Some(Condition::new(
            "navigation-warning",
            "Navigation Warning",
            AlertSeverity::Warning,
            description,
        )),
        2 => Some(Condition::new(
            "navigation-danger",
            "Navigation Error",
            AlertSeverity::Danger,
            description,
        )),
        _ => Some(Condition::new(
            "navigation-critical",
            "Navigation Critical",
            AlertSeverity::Critical,
            description,
        )),
    }
}

fn engineering_condition(
    system: ShipSystem,
    ctx: &AlertContext<'_>,
    c: &Constants,
) -> Option<Condition> {
    let engineering = ctx.engineering?;
    let penalty = penalty_for(system, Some(engineering), ctx.player, c);
    let (suffix, title, severity) = if penalty >= c.engineering_alert_critical {
        ("critical", "System Critical", AlertSeverity::Critical)
    } else if penalty >= c.engineering_alert_danger {
        ("danger", "System Error", AlertSeverity::Danger)
    } else if penalty >= c.engineering_alert_warning {
        ("warning", "Wiring Error", AlertSeverity::Warning)
    } else {
        return None;
    };
    let reduced = ((penalty - 1.0) * 100.0).round();
    Some(Condition {
        id: format!("{}-{suffix}", system.key()),
        name: format!("{} {title}", system.label()),
        severity,
        description: format!("{} performance reduced by {reduced}%", system.label()),
    })
}

fn wiring_condition(ctx: &AlertContext<'_>) -> Option<Condition> {
    let engineering = ctx.engineering?;
    let broken = engineering
        .panels
        .values()
        .filter(|panel| panel.incorrect_count(ctx.player) > 0)
        .count();
    (broken > 0).then(|| {
        Condition::new(
            "engineering-malfunction",
            "Engineering Malfunction",
            AlertSeverity::Warning,
            format!("{broken} panels have wiring errors"),
        )
    })
}

fn power_condition(ctx: &AlertContext<'_>, c: &Constants) -> Option<Condition> {
    let threshold = c.power_regen_base * c.low_power_ratio;
    (ctx.ship.last_power_restored < threshold).then(|| {
        Condition::new(
            "power-generation-low",
            "Low Power Generation",
            AlertSeverity::Warning,
            format!(
                "Generating {:.0} power per second",
                ctx.ship.last_power_restored
            ),
        )
    })
}

/// Full automatic alert set for the current state.
pub fn recompute(
    previous: &BTreeMap<AlertId, Alert>,
    ctx: &AlertContext<'_>,
    constants: &Constants,
) -> BTreeMap<AlertId, Alert> {
    let mut conditions = Vec::new();
    conditions.extend(hazard_condition(ctx, constants));
    conditions.extend(fuel_condition(ctx, constants));
    conditions.extend(navigation_condition(ctx, constants));
    for system in ShipSystem::ALL {
        conditions.extend(engineering_condition(system, ctx, constants));
    }
    conditions.extend(wiring_condition(ctx));
    conditions.extend(power_condition(ctx, constants));

    conditions
        .into_iter()
        .map(|condition| {
            let id = AlertId(condition.id);
            let first_seen_at = previous.get(&id).map_or(ctx.now, |a| a.first_seen_at);
            let alert = Alert {
                id: id.clone(),
                name: condition.name,
                severity: condition.severity,
                first_seen_at,
                description: condition.description,
                owner: ctx.player,
                origin: AlertOrigin::Automatic,
                is_active: true,
                effects: Vec::new(),
                intervals_applied: 0,
            };
            (id, alert)
        })
        .collect()
}

/// Replaces the automatic alert set and emits raise/clear events for the diff.
pub fn reconcile(state: &mut GameState, constants: &Constants) -> Vec<EventEnvelope> {
    let next = recompute(
        &state.alerts.automatic,
        &AlertContext::from_state(state),
        constants,
    );
    let now = state.clock.total_seconds();
    let mut events = Vec::new();

    for (id, alert) in &next {
        if !state.alerts.automatic.contains_key(id) {
            events.push(emit(
                &mut state.counters,
                now,
                Event::AlertRaised {
                    alert_id: id.clone(),
                    severity: alert.severity,
                    name: alert.name.clone(),
                },
            ));
        }
    }
    let cleared: Vec<AlertId> = state
        .alerts
        .automatic
        .keys()
        .filter(|id| !next.contains_key(*id))
        .cloned()
        .collect();
    for alert_id in cleared {
        events.push(emit(
            &mut state.counters,
            now,
            Event::AlertCleared { alert_id },
        ));
    }

    state.alerts.automatic = next;
    events
}

impl AlertBoard {
    /// Manual alerts first, then automatic ones in id order.
    pub fn active(&self) -> Vec<&Alert> {
        self.manual
            .iter()
            .filter(|a| a.is_active)
            .chain(self.automatic.values())
            .collect()
    }

    pub fn count_with_severity(&self, severity: AlertSeverity) -> usize {
        self.active()
            .iter()
            .filter(|a| a.severity == severity)
            .count()
    }
}

pub fn raise_manual(
    state: &mut GameState,
    owner: Player,
    name: String,
    description: String,
    severity: AlertSeverity,
    effects: Vec<SystemEffect>,
) -> AlertId {
    let id = AlertId(format!("manual-{:06}", state.counters.next_alert_id));
    state.counters.next_alert_id += 1;
    state.alerts.manual.push(Alert {
        id: id.clone(),
        name,
        severity,
        first_seen_at: state.clock,
        description,
        owner,
        origin: AlertOrigin::Manual,
        is_active: true,
        effects,
        intervals_applied: 0,
    });
    id
}

pub fn dismiss_manual(state: &mut GameState, alert_id: &AlertId) -> bool {
    let before = state.alerts.manual.len();
    state.alerts.manual.retain(|a| &a.id != alert_id);
    state.alerts.manual.len() != before
}

/// Applies each manual alert's effects once for every multiple of the effect
/// interval the game clock has reached since the alert was raised.
pub fn apply_manual_effects(state: &mut GameState, constants: &Constants) {
    let now = state.clock.total_seconds();
    let interval = constants.manual_alert_effect_interval_secs.max(1);
    let ship = &mut state.ship;
    for alert in &mut state.alerts.manual {
        let raised_in = alert.first_seen_at.total_seconds() / interval;
        let due = (now / interval).saturating_sub(raised_in);
        while alert.intervals_applied < due {
            for effect in &alert.effects {
                ship.gauge_mut(effect.gauge).apply(effect.change_per_interval);
            }
            alert.intervals_applied += 1;
        }
    }
}

fn is_resolved(alert: &Alert, ship: &ShipState) -> bool {
    if alert.effects.is_empty() || alert.intervals_applied == 0 {
        return false;
    }
    alert.effects.iter().all(|effect| match effect.gauge {
        GaugeKind::Hull => ship.hull_damage.current < HULL_RESOLVED_BELOW,
        GaugeKind::Oxygen => ship.oxygen.current > OXYGEN_RESOLVED_ABOVE,
        GaugeKind::Distance | GaugeKind::Fuel | GaugeKind::Battery => false,
    })
}

/// Removes manual alerts whose targeted gauges have recovered.
pub fn resolve_manual(state: &mut GameState) -> Vec<EventEnvelope> {
    let now = state.clock.total_seconds();
    let resolved: Vec<AlertId> = state
        .alerts
        .manual
        .iter()
        .filter(|a| is_resolved(a, &state.ship))
        .map(|a| a.id.clone())
        .collect();
    state.alerts.manual.retain(|a| !resolved.contains(&a.id));
    resolved
        .into_iter()
        .map(|alert_id| emit(&mut state.counters, now, Event::AlertCleared { alert_id }))
        .collect()
}
