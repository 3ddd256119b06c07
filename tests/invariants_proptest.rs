//! Property tests for the structural invariants of combat and medical state

use proptest::prelude::*;

use splatter::combat::grapple::is_consistent;
use splatter::combat::{CombatSession, CombatantEntry, ProximityGraph, SessionSnapshot};
use splatter::core::types::{CharacterId, LocationId};
use splatter::entity::{Character, World};
use splatter::medical::{distribute_damage_to_organs, Anatomy, InjuryType, MedicalState};

const HERE: LocationId = LocationId(1);

/// Raw links for one roster entry, as indices into a pool of ids that
/// includes a few characters who do not exist
type RawLinks = (Option<usize>, Option<usize>, Option<usize>, bool);

fn raw_roster() -> impl Strategy<Value = Vec<RawLinks>> {
    prop::collection::vec(
        (
            prop::option::of(0usize..8),
            prop::option::of(0usize..8),
            prop::option::of(0usize..8),
            any::<bool>(),
        ),
        1..6,
    )
}

fn build_session(raw: &[RawLinks]) -> (World, CombatSession) {
    let mut world = World::new();
    let members: Vec<CharacterId> = (0..raw.len())
        .map(|i| world.spawn(Character::new(&format!("Fighter{i}"), HERE)))
        .collect();
    // Past the roster: strangers in the world, then ids nobody owns
    let stranger = world.spawn(Character::new("Stranger", HERE));
    let mut pool = members.clone();
    pool.push(stranger);
    while pool.len() < 8 {
        pool.push(CharacterId::new());
    }

    let entries = raw
        .iter()
        .zip(&members)
        .enumerate()
        .map(|(seq, ((grappling, grappled_by, target, yielding), id))| {
            let mut entry = CombatantEntry::new(*id, 10, seq as u64);
            entry.grappling = grappling.map(|i| pool[i]);
            entry.grappled_by = grappled_by.map(|i| pool[i]);
            entry.target = target.map(|i| pool[i]);
            entry.is_yielding = *yielding;
            entry
        })
        .collect();

    let snapshot = SessionSnapshot {
        location: HERE,
        round: 0,
        active: true,
        entries,
    };
    let session = CombatSession::restore(snapshot, &world);
    (world, session)
}

#[derive(Debug, Clone)]
enum ProximityOp {
    Establish(usize, usize),
    Separate(usize, usize),
    Clear(usize),
}

fn proximity_op() -> impl Strategy<Value = ProximityOp> {
    prop_oneof![
        (0usize..6, 0usize..6).prop_map(|(a, b)| ProximityOp::Establish(a, b)),
        (0usize..6, 0usize..6).prop_map(|(a, b)| ProximityOp::Separate(a, b)),
        (0usize..6).prop_map(ProximityOp::Clear),
    ]
}

fn human_location() -> impl Strategy<Value = String> {
    prop::sample::select(Anatomy::human().locations())
}

proptest! {
    #[test]
    fn test_restored_grapples_are_symmetric(raw in raw_roster()) {
        let (world, session) = build_session(&raw);

        prop_assert!(is_consistent(&session));
        for entry in session.entries() {
            for link in [entry.grappling, entry.grappled_by, entry.target].into_iter().flatten() {
                prop_assert!(link != entry.character);
                prop_assert!(session.contains(link));
                prop_assert!(world.contains(link));
            }
        }
    }

    #[test]
    fn test_proximity_stays_symmetric(ops in prop::collection::vec(proximity_op(), 0..40)) {
        let ids: Vec<CharacterId> = (0..6).map(|_| CharacterId::new()).collect();
        let mut graph = ProximityGraph::new();

        for op in ops {
            match op {
                ProximityOp::Establish(a, b) => {
                    graph.establish(ids[a], ids[b]);
                }
                ProximityOp::Separate(a, b) => graph.separate(ids[a], ids[b]),
                ProximityOp::Clear(a) => graph.clear(ids[a]),
            }
            prop_assert!(graph.is_symmetric());
        }
        for id in &ids {
            prop_assert!(!graph.is_in_proximity(*id, *id));
        }
    }

    #[test]
    fn test_organ_hp_stays_in_bounds(hits in prop::collection::vec((human_location(), 0u32..60), 0..25)) {
        let mut state = MedicalState::new(&Anatomy::human());
        let mut dice = splatter::core::dice::SeededDice::new(7);

        for (location, amount) in hits {
            let report = splatter::medical::apply_anatomical_damage(
                &mut state, amount, &location, InjuryType::Blade, None, &mut dice,
            );
            prop_assert!(report.total_damage <= amount);
        }
        for organ in state.organs() {
            prop_assert!(organ.current_hp() <= organ.max_hp());
        }
        prop_assert!((0.0..=1.0).contains(&state.consciousness()));
        prop_assert!(state.blood_level() >= 0.0);
    }

    #[test]
    fn test_distribution_sums_to_total(location in human_location(), total in 0u32..500) {
        let state = MedicalState::new(&Anatomy::human());

        let shares = distribute_damage_to_organs(&state, &location, total, None);

        prop_assert!(!shares.is_empty());
        prop_assert_eq!(shares.iter().map(|(_, d)| *d).sum::<u32>(), total);
        for (organ, _) in &shares {
            prop_assert_eq!(&state.organ(organ).unwrap().container, &location);
        }
    }
}
