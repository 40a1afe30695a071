//! Turn-0 origin events.
//!
//! Three canonical exchanges that set the stage before the first turn: the
//! paradox deflection, the first ricochet, and the truce that hands the beer
//! holder its drink and primes the spite meter. Each fires only when every
//! role it names is on the roster.

use sb_core::{Event, Frame, Outcome, Roster};

use crate::config::Roles;

/// Apply the prologue to `roster` and return its events in order.
pub fn run(roster: &mut Roster, roles: &Roles) -> Vec<Event> {
    let mut events = Vec::new();
    let (beer, paradox, magnet, spite) = (
        roles.beer.as_str(),
        roles.paradox.as_str(),
        roles.magnet.as_str(),
        roles.spite.as_str(),
    );

    if roster.contains_all(&[beer, paradox, magnet]) {
        events.push(origin(
            beer,
            paradox,
            Outcome::Paradox,
            magnet,
            format!("{paradox} sees it coming. {magnet} gets hit."),
        ));
        credit(roster, beer, magnet);
    }

    if roster.contains_all(&[magnet, beer, spite]) {
        events.push(origin(
            magnet,
            beer,
            Outcome::RicochetHit,
            spite,
            format!("{beer} ducks. {spite} gets smacked."),
        ));
        credit(roster, magnet, spite);
    }

    if roster.contains_all(&[spite, beer]) {
        if let Some(agent) = roster.get_mut(spite) {
            agent.spite_meter = agent.spite_gain_on_hit;
        }
        if let Some(agent) = roster.get_mut(beer) {
            agent.holding_beer = true;
            agent.frame = Frame::Ontological;
            agent.beer_dodge_bonus = 0.0;
        }
        events.push(origin(
            spite,
            beer,
            Outcome::Diplomacy,
            beer,
            format!("'Hold my beer.' {spite} spite active. {beer} beer mode active."),
        ));
    }

    tracing::debug!(events = events.len(), "prologue recorded");
    events
}

fn origin(thrower: &str, intended: &str, outcome: Outcome, actual: &str, note: String) -> Event {
    Event::new(0, thrower, intended, outcome, actual)
        .with_note(format!("Canon origin: {note}"))
        .with_rolls(0.0, 0.0, 1.0)
        .with_tag("prologue")
}

fn credit(roster: &mut Roster, thrower: &str, target: &str) {
    if let Some(agent) = roster.get_mut(thrower) {
        agent.landed += 1;
    }
    if let Some(agent) = roster.get_mut(target) {
        agent.taken += 1;
    }
}
