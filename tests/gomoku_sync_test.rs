//! Tests for the input lock and reconciliation protocol.

use strictly_gomoku_sync::{
    Cell, ChannelError, Coordinate, Disposition, Game, GameState, InMemoryChannel, Outcome,
    Player, Presenter, ReplicationChannel, SessionManager, SnapshotError, SyncController,
};

const KEY: &str = "gomoku_game_test";

/// Presenter that records every notification.
#[derive(Debug, Default)]
struct Recorder {
    redraws: Vec<(GameState, Vec<Coordinate>)>,
    faults: Vec<String>,
}

impl Presenter for Recorder {
    fn on_state_changed(&mut self, state: &GameState, winning_line: &[Coordinate]) {
        self.redraws.push((state.clone(), winning_line.to_vec()));
    }

    fn on_degraded(&mut self, error: &ChannelError) {
        self.faults.push(error.message.clone());
    }
}

fn at(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col)
}

fn controller(channel: &InMemoryChannel) -> SyncController<InMemoryChannel, Recorder> {
    SyncController::new(KEY, Game::new(15).unwrap(), channel.clone(), Recorder::default())
}

/// Two clients of one match sharing a store.
fn two_clients() -> (
    InMemoryChannel,
    SessionManager<InMemoryChannel, Recorder>,
    SessionManager<InMemoryChannel, Recorder>,
) {
    let channel = InMemoryChannel::new();
    let mut alice = SessionManager::new(channel.clone());
    let mut bob = SessionManager::new(channel.clone());
    alice.open(KEY, 15, Recorder::default()).unwrap();
    bob.open(KEY, 15, Recorder::default()).unwrap();
    (channel, alice, bob)
}

/// Snapshot of a game where Black has just completed row 7.
fn winning_snapshot_json() -> String {
    let mut game = Game::new(15).unwrap();
    for col in 3..7 {
        game.import(game.speculate(at(7, col)).unwrap()).unwrap();
        game.import(game.speculate(at(0, col)).unwrap()).unwrap();
    }
    let last = game.speculate(at(7, 7)).unwrap();
    last.to_json().unwrap()
}

#[test]
fn test_lock_held_until_echo() {
    let channel = InMemoryChannel::new();
    let subscription = channel.subscribe(KEY).unwrap();
    let mut sync = controller(&channel);

    assert!(!sync.is_input_locked());
    assert_eq!(sync.on_cell_clicked(at(7, 7)), Disposition::Published);
    assert!(sync.is_input_locked());

    // Authoritative state is unchanged until delivery.
    assert_eq!(sync.state().board().stone_count(), 0);

    let echo = subscription.next_change().unwrap();
    sync.on_change(&echo).unwrap();

    assert!(!sync.is_input_locked());
    assert_eq!(
        sync.state().board().get(at(7, 7)).unwrap(),
        Cell::Occupied(Player::Black)
    );
    assert_eq!(sync.state().current_player(), Player::White);
    assert_eq!(sync.presenter().redraws.len(), 1);
}

#[test]
fn test_clicks_while_locked_are_dropped() {
    let (_channel, mut alice, _bob) = two_clients();
    let session = alice.get_mut(KEY).unwrap();

    assert!(session.report_cell_activated(1, 1).is_published());
    assert_eq!(
        session.report_cell_activated(2, 2),
        Disposition::IgnoredLocked
    );

    alice.pump_all();
    let session = alice.get(KEY).unwrap();
    let board = session.controller().state().board();
    assert_eq!(board.stone_count(), 1);
    assert!(board.is_empty(at(2, 2)));
}

#[test]
fn test_occupied_cell_is_ignored_without_lock() {
    let (_channel, mut alice, mut bob) = two_clients();
    alice.get_mut(KEY).unwrap().report_cell_activated(4, 4);
    alice.pump_all();
    bob.pump_all();

    let session = bob.get_mut(KEY).unwrap();
    assert_eq!(
        session.report_cell_activated(4, 4),
        Disposition::IgnoredIllegal
    );
    assert!(!session.controller().is_input_locked());
}

#[test]
fn test_peer_move_reaches_both_clients() {
    let (_channel, mut alice, mut bob) = two_clients();
    alice.get_mut(KEY).unwrap().report_cell_activated(7, 7);
    alice.pump_all();
    bob.pump_all();

    bob.get_mut(KEY).unwrap().report_cell_activated(7, 8);
    alice.pump_all();
    bob.pump_all();

    let a = alice.get(KEY).unwrap().controller().state().clone();
    let b = bob.get(KEY).unwrap().controller().state().clone();
    assert_eq!(a, b);
    assert_eq!(a.board().stone_count(), 2);
    assert_eq!(
        a.board().get(at(7, 8)).unwrap(),
        Cell::Occupied(Player::White)
    );
    assert_eq!(a.current_player(), Player::Black);
}

#[test]
fn test_same_snapshot_twice_is_idempotent() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    let json = winning_snapshot_json();

    sync.on_remote_change_delivered(&json).unwrap();
    let state = sync.state().clone();
    let line = sync.winning_line().to_vec();
    assert_eq!(line.len(), 5);

    sync.on_remote_change_delivered(&json).unwrap();
    assert_eq!(sync.state(), &state);
    assert_eq!(sync.winning_line(), line.as_slice());
}

#[test]
fn test_race_last_delivered_snapshot_wins() {
    let prior = Game::new(15).unwrap();
    let s1 = prior.speculate(at(0, 0)).unwrap();
    let s2 = prior.speculate(at(0, 1)).unwrap();

    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    sync.on_remote_change_delivered(&s1.to_json().unwrap())
        .unwrap();
    sync.on_remote_change_delivered(&s2.to_json().unwrap())
        .unwrap();

    let board = sync.state().board();
    assert!(board.is_empty(at(0, 0)));
    assert_eq!(board.get(at(0, 1)).unwrap(), Cell::Occupied(Player::Black));
    assert_eq!(board.stone_count(), 1);
    assert!(sync.state().same_position(&s2));
}

#[test]
fn test_race_resolves_by_delivery_not_publish_order() {
    let prior = Game::new(15).unwrap();
    let s1 = prior.speculate(at(0, 0)).unwrap();
    let s2 = prior.speculate(at(0, 1)).unwrap();

    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    sync.on_remote_change_delivered(&s2.to_json().unwrap())
        .unwrap();
    sync.on_remote_change_delivered(&s1.to_json().unwrap())
        .unwrap();

    assert!(sync.state().same_position(&s1));
}

#[test]
fn test_race_between_two_clients_converges_on_later_move() {
    let (_channel, mut alice, mut bob) = two_clients();

    // Both unlocked, both see the empty board.
    assert!(alice.get_mut(KEY).unwrap().report_cell_activated(0, 0).is_published());
    assert!(bob.get_mut(KEY).unwrap().report_cell_activated(0, 1).is_published());

    assert_eq!(alice.pump_all(), 2);
    assert_eq!(bob.pump_all(), 2);

    for client in [&alice, &bob] {
        let controller = client.get(KEY).unwrap().controller();
        let board = controller.state().board();
        assert!(board.is_empty(at(0, 0)));
        assert_eq!(board.get(at(0, 1)).unwrap(), Cell::Occupied(Player::Black));
        assert_eq!(controller.state().current_player(), Player::White);
        assert!(!controller.is_input_locked());
    }
}

#[test]
fn test_terminal_board_ignores_clicks() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    sync.on_remote_change_delivered(&winning_snapshot_json())
        .unwrap();

    assert_eq!(sync.state().outcome(), Outcome::Won(Player::Black));
    assert_eq!(sync.on_cell_clicked(at(14, 14)), Disposition::IgnoredTerminal);
    assert!(!sync.is_input_locked());

    let (_, line) = sync.presenter().redraws.last().unwrap();
    assert_eq!(line, &vec![at(7, 3), at(7, 4), at(7, 5), at(7, 6), at(7, 7)]);
}

#[test]
fn test_reset_allowed_while_locked() {
    let (_channel, mut alice, mut bob) = two_clients();
    let session = alice.get_mut(KEY).unwrap();
    assert!(session.report_cell_activated(5, 5).is_published());
    assert_eq!(session.report_reset_activated(), Disposition::Published);
    assert!(session.controller().is_input_locked());

    alice.pump_all();
    bob.pump_all();

    for client in [&alice, &bob] {
        let controller = client.get(KEY).unwrap().controller();
        assert_eq!(controller.state().board().stone_count(), 0);
        assert_eq!(controller.state().current_player(), Player::Black);
        assert_eq!(controller.state().outcome(), Outcome::InProgress);
        assert!(!controller.is_input_locked());
    }
}

#[test]
fn test_reset_delivered_last_beats_peer_move() {
    let (_channel, mut alice, mut bob) = two_clients();
    alice.get_mut(KEY).unwrap().report_cell_activated(3, 3);
    bob.get_mut(KEY).unwrap().report_reset_activated();

    alice.pump_all();
    bob.pump_all();

    for client in [&alice, &bob] {
        let controller = client.get(KEY).unwrap().controller();
        assert_eq!(controller.state().board().stone_count(), 0);
    }
}

#[test]
fn test_malformed_snapshot_leaves_state_and_lock() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    assert!(sync.on_cell_clicked(at(7, 7)).is_published());

    let result = sync.on_remote_change_delivered("{\"board\": oops");
    assert!(matches!(result, Err(SnapshotError::Decode(_))));
    assert!(sync.is_input_locked());
    assert_eq!(sync.state().board().stone_count(), 0);
    assert!(sync.presenter().redraws.is_empty());
}

#[test]
fn test_wrong_dimension_snapshot_rejected() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    let small = Game::new(9).unwrap().export().to_json().unwrap();

    assert_eq!(
        sync.on_remote_change_delivered(&small),
        Err(SnapshotError::DimensionMismatch {
            expected: 15,
            found: 9
        })
    );
    assert_eq!(sync.state().board().size(), 15);
}

#[test]
fn test_pump_skips_malformed_change() {
    let (channel, mut alice, _bob) = two_clients();
    channel.publish(KEY, "not a snapshot").unwrap();
    alice.get_mut(KEY).unwrap().report_cell_activated(6, 6);

    assert_eq!(alice.pump_all(), 1);
    let controller = alice.get(KEY).unwrap().controller();
    assert_eq!(controller.state().board().stone_count(), 1);
}

#[test]
fn test_unavailable_channel_degrades_without_locking() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    channel.set_available(false);

    assert_eq!(sync.on_cell_clicked(at(7, 7)), Disposition::PublishFailed);
    assert!(!sync.is_input_locked());
    assert!(sync.is_degraded());
    assert_eq!(sync.presenter().faults.len(), 1);

    channel.set_available(true);
    assert_eq!(sync.on_cell_clicked(at(7, 7)), Disposition::Published);
    assert!(!sync.is_degraded());
}

#[test]
fn test_undelivered_publish_keeps_lock() {
    let channel = InMemoryChannel::new();
    let mut sync = controller(&channel);
    assert!(sync.on_cell_clicked(at(0, 0)).is_published());

    // No delivery ever arrives.
    for col in 1..5 {
        assert_eq!(sync.on_cell_clicked(at(0, col)), Disposition::IgnoredLocked);
    }
    assert!(sync.is_input_locked());
}

#[test]
fn test_late_joiner_adopts_stored_state() {
    let (channel, mut alice, _bob) = two_clients();
    alice.get_mut(KEY).unwrap().report_cell_activated(7, 7);
    alice.pump_all();

    let mut carol = SessionManager::new(channel);
    let session = carol.open(KEY, 15, Recorder::default()).unwrap();
    let controller = session.controller();

    assert_eq!(controller.state().board().stone_count(), 1);
    assert_eq!(controller.state().current_player(), Player::White);
    assert!(!controller.is_input_locked());
    assert_eq!(controller.presenter().redraws.len(), 1);
}

#[test]
fn test_bootstrap_ignores_malformed_stored_state() {
    let channel = InMemoryChannel::new();
    channel.publish(KEY, "[]").unwrap();
    let mut sync = controller(&channel);

    assert!(!sync.bootstrap());
    assert_eq!(sync.state().board().stone_count(), 0);
    assert!(!sync.is_degraded());
}
