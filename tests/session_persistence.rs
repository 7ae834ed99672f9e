//! Save and load round trips for a running session.

use cairn::{Autopilot, CairnError, CairnResult, ClassKind, GameState, Mode};

/// Plays `steps` autopilot actions, then keeps going until no encounter is
/// open so the session can be saved.
fn play_to_quiet_point(game: &mut GameState, steps: u64) {
    let pilot = Autopilot::new();
    pilot.run(game, steps, u32::MAX).unwrap();
    for _ in 0..1_000 {
        if game.mode() != Mode::Combat {
            return;
        }
        pilot.step(game).unwrap();
    }
}

#[test]
fn test_save_and_load_file_round_trip() -> CairnResult<()> {
    let mut game = GameState::new_game(ClassKind::Rogue, 4242);
    play_to_quiet_point(&mut game, 60);
    assert_ne!(game.mode(), Mode::Combat);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    game.save_to_file(&path)?;
    let loaded = GameState::load_from_file(&path)?;
    assert_eq!(loaded, game);
    assert_eq!(loaded.seed(), 4242);
    assert_eq!(
        loaded.dungeon().explored_count(),
        game.dungeon().explored_count()
    );
    Ok(())
}

#[test]
fn test_loaded_session_continues_identically() -> CairnResult<()> {
    let mut original = GameState::new_game(ClassKind::Mage, 777);
    play_to_quiet_point(&mut original, 40);
    if original.mode() == Mode::GameOver {
        return Ok(());
    }

    let mut restored = GameState::load_from_json(&original.save_to_json()?)?;
    let pilot = Autopilot::new();
    let a = pilot.run(&mut original, 150, u32::MAX)?;
    let b = pilot.run(&mut restored, 150, u32::MAX)?;
    assert_eq!(a, b);
    assert_eq!(
        original.messages().collect::<Vec<_>>(),
        restored.messages().collect::<Vec<_>>()
    );
    assert_eq!(original.dungeon(), restored.dungeon());
    Ok(())
}

#[test]
fn test_cannot_save_mid_encounter() {
    let pilot = Autopilot::new();
    for seed in 0..20 {
        let mut game = GameState::new_game(ClassKind::Warrior, seed);
        for _ in 0..500 {
            if game.mode() != Mode::Exploring {
                break;
            }
            pilot.step(&mut game).unwrap();
        }
        if game.mode() == Mode::Combat {
            assert!(matches!(
                game.save_to_json(),
                Err(CairnError::InvalidState(_))
            ));
            return;
        }
    }
}

#[test]
fn test_corrupt_save_is_rejected() {
    assert!(matches!(
        GameState::load_from_json("{ \"floor\": 1 }"),
        Err(CairnError::Serde(_))
    ));
    assert!(matches!(
        GameState::load_from_file("/no/such/save.json"),
        Err(CairnError::Io(_))
    ));
}
