//! Paying prices.
//!
//! Card prices are in Megacredits; Building prices also take steel and
//! Space prices titanium, each metal unit worth its base value plus any
//! `IncreasedMetalsValue` bonus. The engine never asks how to pay: it
//! computes one deterministic split per [`PaymentPolicy`]. A metal unit
//! may overpay by less than its value when Megacredits run short; the
//! excess is lost.

use crate::core::{
    Cost, EngineError, PaymentPolicy, PlayerState, Resource, ResourceMap, Shortfall,
};

/// Megacredit value of each metal for one payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetalValues {
    pub steel: u32,
    pub titanium: u32,
}

/// How much of each resource a price takes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Payment {
    pub amounts: ResourceMap<u32>,
}

impl Payment {
    /// Deduct from the payer, all or nothing.
    pub fn apply(&self, payer: &mut PlayerState) -> Result<(), EngineError> {
        if let Some((resource, needed)) = self
            .amounts
            .iter()
            .find(|&(r, n)| payer.stock[r] < n)
        {
            return Err(EngineError::short_of(resource, needed, payer.stock[resource]));
        }
        for (resource, amount) in self.amounts.iter() {
            payer.stock[resource] -= amount;
        }
        Ok(())
    }
}

/// Everything `stock` could put toward `cost`, in Megacredits.
#[must_use]
pub fn buying_power(cost: Cost, stock: &ResourceMap<u32>, values: MetalValues) -> u32 {
    let mut power = stock[Resource::Megacredits];
    if cost.accepts_steel() {
        power += stock[Resource::Steel] * values.steel;
    }
    if cost.accepts_titanium() {
        power += stock[Resource::Titanium] * values.titanium;
    }
    power
}

/// Work out how to pay `cost` from `stock`.
pub fn plan_payment(
    cost: Cost,
    stock: &ResourceMap<u32>,
    values: MetalValues,
    policy: PaymentPolicy,
) -> Result<Payment, EngineError> {
    let amount = cost.amount();

    if let Some(resource) = cost.raw_resource() {
        if stock[resource] < amount {
            return Err(EngineError::short_of(resource, amount, stock[resource]));
        }
        return Ok(Payment {
            amounts: ResourceMap::default().with(resource, amount),
        });
    }

    let caps = MetalCaps {
        steel: if cost.accepts_steel() && values.steel > 0 { stock[Resource::Steel] } else { 0 },
        titanium: if cost.accepts_titanium() && values.titanium > 0 {
            stock[Resource::Titanium]
        } else {
            0
        },
    };
    let megacredits = stock[Resource::Megacredits];

    let (steel, titanium) = match policy {
        PaymentPolicy::MetalsFirst => metals_first(amount, megacredits, caps, values),
        PaymentPolicy::MegacreditsFirst => {
            match cover_remainder(amount.saturating_sub(megacredits), caps, values) {
                Some(split) => split,
                None => return Err(short_of_buying_power(cost, stock, values)),
            }
        }
    };

    let metal_value = steel * values.steel + titanium * values.titanium;
    let owed = amount.saturating_sub(metal_value);
    if owed > megacredits {
        return Err(short_of_buying_power(cost, stock, values));
    }

    Ok(Payment {
        amounts: ResourceMap::default()
            .with(Resource::Megacredits, owed)
            .with(Resource::Steel, steel)
            .with(Resource::Titanium, titanium),
    })
}

/// Metal units a price may draw on.
#[derive(Clone, Copy, Debug)]
struct MetalCaps {
    steel: u32,
    titanium: u32,
}

fn short_of_buying_power(cost: Cost, stock: &ResourceMap<u32>, values: MetalValues) -> EngineError {
    EngineError::InsufficientResources {
        what: Shortfall::BuyingPower,
        needed: cost.amount().into(),
        available: buying_power(cost, stock, values).into(),
    }
}

/// Greedy titanium then steel; a remainder below one metal unit that
/// money cannot cover takes one more unit of the cheaper metal.
fn metals_first(amount: u32, megacredits: u32, caps: MetalCaps, values: MetalValues) -> (u32, u32) {
    let mut rest = amount;
    let mut titanium = caps.titanium.min(rest / values.titanium.max(1));
    rest -= titanium * values.titanium;
    let mut steel = caps.steel.min(rest / values.steel.max(1));
    rest -= steel * values.steel;
    rest = rest.saturating_sub(megacredits);
    if rest > 0 && steel < caps.steel {
        steel += 1;
        rest = rest.saturating_sub(values.steel);
    }
    if rest > 0 && titanium < caps.titanium {
        titanium += 1;
    }
    (steel, titanium)
}

/// The metal split covering `rest` with the least overshoot, fewer
/// titanium on ties. `None` when the metals cannot cover it.
fn cover_remainder(rest: u32, caps: MetalCaps, values: MetalValues) -> Option<(u32, u32)> {
    if rest == 0 {
        return Some((0, 0));
    }
    let steel_value = values.steel.max(1);
    let titanium_value = values.titanium.max(1);
    let most_titanium = caps.titanium.min(rest.div_ceil(titanium_value));

    let mut best: Option<(u32, u32, u32)> = None;
    for titanium in 0..=most_titanium {
        let left = rest.saturating_sub(titanium * values.titanium);
        let steel = caps.steel.min(left.div_ceil(steel_value));
        let covered = steel * values.steel + titanium * values.titanium;
        if covered < rest {
            continue;
        }
        let overshoot = covered - rest;
        if best.map_or(true, |(_, _, o)| overshoot < o) {
            best = Some((steel, titanium, overshoot));
        }
    }
    best.map(|(steel, titanium, _)| (steel, titanium))
}
