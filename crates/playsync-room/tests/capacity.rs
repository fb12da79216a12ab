//! Property tests for room membership.

use playsync_protocol::{PlayerId, RoomCode};
use playsync_room::{Player, Room, RoomConfig, RoomError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Join(u64),
    Leave(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(1u64..6).prop_map(Op::Join), (1u64..6).prop_map(Op::Leave)]
}

proptest! {
    #[test]
    fn test_player_count_never_exceeds_max(ops in proptest::collection::vec(op(), 0..40)) {
        let mut room = Room::new(RoomCode::new("PROPTEST"), RoomConfig::default());
        for op in ops {
            match op {
                Op::Join(id) => {
                    let was_full = room.player_count() >= 2;
                    let present = room.player(PlayerId(id)).is_some();
                    let result = room.add_player(Player::new(PlayerId(id), "P", "#0D9488", None));
                    if present {
                        prop_assert!(matches!(result, Err(RoomError::AlreadyMember(..))));
                    } else if was_full {
                        prop_assert!(matches!(result, Err(RoomError::RoomFull(_))));
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                Op::Leave(id) => {
                    let _ = room.remove_player(PlayerId(id));
                }
            }
            prop_assert!(room.player_count() <= 2);
            let snapshot = room.snapshot();
            prop_assert_eq!(snapshot.players.len(), room.player_count());
            for id in room.player_ids() {
                prop_assert!(room.player(*id).is_some());
            }
        }
    }
}
