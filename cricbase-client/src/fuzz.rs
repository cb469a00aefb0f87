#![cfg(test)]

use std::{collections::HashSet, panic::AssertUnwindSafe};

use chrono::Utc;
use cricbase_mock_server::MockServer;

use crate::{
    api::{self, CommentId, DeliveryId, DeliveryItem, Error, FeedFilter, MatchId, User, Vote},
    CommentTree, DeliveryFeed, LoadState,
};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

/// Every node's `parent_id` names the node it hangs under, and ids are unique
fn check_structure(tree: &CommentTree) {
    let mut seen = HashSet::new();
    let mut stack = tree.roots().iter().map(|c| (None, c, 0)).collect::<Vec<_>>();
    while let Some((parent, c, depth)) = stack.pop() {
        assert_eq!(c.parent_id.as_ref(), parent, "bad parent for {}", c.id);
        assert!(seen.insert(c.id.clone()), "duplicate id {}", c.id);
        assert_eq!(tree.depth_of(&c.id), Ok(depth));
        stack.extend(c.children.iter().map(|k| (Some(&c.id), k, depth + 1)));
    }
    assert_eq!(seen.len(), tree.len());
}

fn pick(tree: &CommentTree, i: u8) -> Option<CommentId> {
    let entries = tree.flatten();
    match entries.len() {
        0 => None,
        n => Some(entries[usize::from(i) % n].comment.id.clone()),
    }
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum TreeOp {
    Reply {
        parent: Option<u8>,
        blank: bool,
    },
    Vote {
        target: u8,
        up: bool,
    },
    Confirm {
        target: u8,
    },
    Retract {
        target: u8,
    },
}

#[test]
fn local_tree_operations() {
    bolero::check!()
        .with_type::<Vec<TreeOp>>()
        .cloned()
        .for_each(|ops| {
            let mut tree = CommentTree::new(DeliveryId::from("d"), User::stub());
            let mut next_stored = 0;
            for op in ops {
                match op {
                    TreeOp::Reply { parent, blank } => {
                        let parent = parent.and_then(|p| pick(&tree, p));
                        let len = tree.len();
                        let content = match blank {
                            true => " \t",
                            false => "howzat",
                        };
                        match tree.reply(parent.as_ref(), content) {
                            Ok(c) => {
                                assert!(!blank);
                                assert!(c.pending);
                                assert_eq!(c.parent_id, parent);
                                assert_eq!(tree.len(), len + 1);
                            }
                            Err(Error::Validation(_)) => {
                                assert!(blank);
                                assert_eq!(tree.len(), len);
                            }
                            Err(e) => panic!("unexpected error {e:?}"),
                        }
                    }
                    TreeOp::Vote { target, up } => {
                        let Some(id) = pick(&tree, target) else { continue };
                        let direction = match up {
                            true => Vote::Up,
                            false => Vote::Down,
                        };
                        let before = tree.vote_state(&id).unwrap();
                        let after = tree.vote(&id, direction).unwrap();
                        assert_eq!(after.user_vote, Some(direction));
                        let total_before = before.upvotes + before.downvotes;
                        let total_after = after.upvotes + after.downvotes;
                        match before.user_vote {
                            Some(d) if d == direction => assert_eq!(after.vote_state(), before),
                            Some(_) => assert_eq!(total_after, total_before),
                            None => assert_eq!(total_after, total_before + 1),
                        }
                    }
                    TreeOp::Confirm { target } => {
                        let Some(id) = pick(&tree, target) else { continue };
                        let pending = tree.get(&id).unwrap().pending;
                        next_stored += 1;
                        let stored = api::Comment {
                            id: CommentId(format!("s{next_stored}")),
                            delivery_id: None,
                            user_id: None,
                            user: User::stub(),
                            content: String::from("howzat"),
                            created_at: Utc::now(),
                            upvotes: 0,
                            downvotes: 0,
                            parent_id: None,
                            replies: Vec::new(),
                            user_vote: None,
                        };
                        match tree.confirm_reply(&id, stored) {
                            Ok(()) => assert!(pending),
                            Err(Error::Validation(_)) => assert!(!pending),
                            Err(e) => panic!("unexpected error {e:?}"),
                        }
                    }
                    TreeOp::Retract { target } => {
                        let Some(id) = pick(&tree, target) else { continue };
                        let len = tree.len();
                        let pending = tree.get(&id).unwrap().pending;
                        match tree.retract_pending(&id) {
                            Ok(c) => {
                                assert!(pending);
                                let mut removed = 0;
                                let mut stack = vec![&c];
                                while let Some(c) = stack.pop() {
                                    removed += 1;
                                    stack.extend(c.children.iter());
                                }
                                assert_eq!(tree.len(), len - removed);
                                assert!(tree.get(&id).is_none());
                            }
                            Err(Error::Validation(_)) => assert!(!pending),
                            Err(e) => panic!("unexpected error {e:?}"),
                        }
                    }
                }
                check_structure(&tree);
            }
        })
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum SyncOp {
    Reply { parent: Option<u8>, fail: bool },
    Vote { target: u8, up: bool, fail: bool },
}

type Shape = Vec<(CommentId, usize, u32, u32, Option<Vote>, String)>;

fn shape(tree: &CommentTree) -> Shape {
    tree.flatten()
        .into_iter()
        .map(|e| {
            let c = e.comment;
            (
                c.id.clone(),
                e.depth,
                c.upvotes,
                c.downvotes,
                c.user_vote,
                c.content.clone(),
            )
        })
        .collect()
}

do_tokio_test!(
    sync_matches_backend,
    Vec<SyncOp>,
    |ops: Vec<SyncOp>| async move {
        let server = MockServer::with_fixtures();
        let delivery = DeliveryId::from("1_93");
        let mut tree = CommentTree::new(delivery.clone(), server.viewer());
        tree.refresh(&server).await.unwrap();
        for (i, op) in ops.into_iter().enumerate() {
            match op {
                SyncOp::Reply { parent, fail } => {
                    let parent = parent.and_then(|p| pick(&tree, p));
                    if fail {
                        server.fail_next(1);
                    }
                    let res = tree
                        .submit_reply(&server, parent.as_ref(), &format!("reply {i}"))
                        .await;
                    assert_eq!(res.is_err(), fail);
                }
                SyncOp::Vote { target, up, fail } => {
                    let Some(id) = pick(&tree, target) else { continue };
                    let direction = match up {
                        true => Vote::Up,
                        false => Vote::Down,
                    };
                    let noop = tree.get(&id).unwrap().user_vote == Some(direction);
                    if fail {
                        server.fail_next(1);
                    }
                    let res = tree.submit_vote(&server, &id, direction).await;
                    if fail && noop {
                        // nothing was posted, so the failure is still armed
                        server.fail_next(0);
                    }
                    assert_eq!(res.is_err(), fail && !noop);
                }
            }
            check_structure(&tree);

            let mut fresh = CommentTree::new(delivery.clone(), server.viewer());
            fresh.refresh(&server).await.unwrap();
            assert_eq!(shape(&tree), shape(&fresh));
        }
    }
);

fn page_item(n: u8) -> DeliveryItem {
    DeliveryItem {
        id: DeliveryId(format!("m_{n}")),
        match_id: MatchId::from("m"),
        over: u32::from(n / 6),
        ball: u32::from(n % 6) + 1,
        bowler: String::from("Mitchell Starc"),
        batsman: String::from("Rohit Sharma"),
        runs: u32::from(n % 7),
        is_wicket: false,
        wicket_type: None,
        is_four: n % 7 == 4,
        is_six: n % 7 == 6,
        description: String::new(),
        timestamp: None,
        comment_count: 0,
        type_tag: None,
    }
}

#[test]
fn overlapping_pages() {
    bolero::check!()
        .with_type::<Vec<Vec<u8>>>()
        .cloned()
        .for_each(|pages| {
            let mut feed = DeliveryFeed::new();
            let mut request = Some(feed.reset(MatchId::from("m"), FeedFilter::All));
            let mut expected = Vec::new();
            let mut seen = HashSet::new();
            let mut after: Option<DeliveryId> = None;
            let mut exhausted = false;
            for page in pages {
                let Some(req) = request.take() else { break };
                assert_eq!(req.after, after);
                let last = page.last().map(|&n| DeliveryId(format!("m_{n}")));
                let res = feed.finish(req, Ok(page.iter().copied().map(page_item).collect()));
                match last {
                    None => {
                        assert_eq!(res, Ok(0));
                        exhausted = true;
                    }
                    Some(last) if Some(&last) == after.as_ref() => {
                        assert!(matches!(res, Err(Error::InvalidData(_))));
                        assert_eq!(feed.state(), LoadState::Error);
                    }
                    Some(last) => {
                        let mut added = 0;
                        for &n in page.iter() {
                            if seen.insert(n) {
                                expected.push(format!("m_{n}"));
                                added += 1;
                            }
                        }
                        assert_eq!(res, Ok(added));
                        after = Some(last);
                    }
                }
                request = feed.load_more();
                assert_eq!(request.is_none(), exhausted);
            }

            let ids = feed
                .items()
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>();
            assert_eq!(ids, expected);
            if exhausted {
                assert_eq!(feed.state(), LoadState::Exhausted);
                assert!(!feed.has_more());
            }
            let sixes = feed.items().iter().filter(|i| i.is_six).count();
            feed.apply_filter(FeedFilter::Sixes);
            assert_eq!(feed.visible_items().count(), sixes);
        })
}
