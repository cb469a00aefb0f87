use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::api::{self, CommentId, DeliveryId, Error, Time, User, Vote};

/// Comments at this depth or deeper are not offered a reply action
pub const MAX_REPLY_DEPTH: usize = 5;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub author: User,
    pub created_at: Time,
    pub upvotes: u32,
    pub downvotes: u32,

    /// Vote of the current viewer
    pub user_vote: Option<Vote>,

    /// Replies, in the order they were made
    pub children: Vec<Comment>,

    /// Created locally and not yet acknowledged by the backend
    pub pending: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteState {
    pub upvotes: u32,
    pub downvotes: u32,
    pub user_vote: Option<Vote>,
}

impl Comment {
    fn from_wire(c: api::Comment, enclosing: Option<CommentId>) -> Comment {
        Comment {
            id: c.id,
            parent_id: c.parent_id.or(enclosing),
            content: c.content,
            author: c.user,
            created_at: c.created_at,
            upvotes: c.upvotes,
            downvotes: c.downvotes,
            user_vote: c.user_vote,
            children: Vec::new(),
            pending: false,
        }
    }

    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    pub fn vote_state(&self) -> VoteState {
        VoteState {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            user_vote: self.user_vote,
        }
    }

    /// Returns false if the viewer had already cast this exact vote
    fn apply_vote(&mut self, direction: Vote) -> bool {
        if self.user_vote == Some(direction) {
            return false;
        }
        match self.user_vote {
            Some(Vote::Up) => self.upvotes = self.upvotes.saturating_sub(1),
            Some(Vote::Down) => self.downvotes = self.downvotes.saturating_sub(1),
            None => (),
        }
        match direction {
            Vote::Up => self.upvotes += 1,
            Vote::Down => self.downvotes += 1,
        }
        self.user_vote = Some(direction);
        true
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ThreadEntry<'a> {
    pub comment: &'a Comment,
    pub depth: usize,
    pub can_reply: bool,
}

/// The comment forest of a single delivery, for one detail-view session
#[derive(Clone, Debug)]
pub struct CommentTree {
    delivery_id: DeliveryId,
    viewer: User,
    roots: Vec<Comment>,
}

impl CommentTree {
    pub fn new(delivery_id: DeliveryId, viewer: User) -> CommentTree {
        CommentTree {
            delivery_id,
            viewer,
            roots: Vec::new(),
        }
    }

    pub fn delivery_id(&self) -> &DeliveryId {
        &self.delivery_id
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.path_to(id).map(|path| self.node(&path))
    }

    /// Replaces the whole forest
    ///
    /// `items` may be nested through `replies`, flat with `parent_id`s, or a mix
    /// of both. Comments whose parent cannot be resolved (along with their own
    /// replies) are dropped and reported as `InvalidData`; everything else is
    /// loaded regardless.
    pub fn load_roots(&mut self, items: Vec<api::Comment>) -> Result<(), Error> {
        let mut flat = Vec::new();
        let mut stack = items
            .into_iter()
            .rev()
            .map(|c| (None, c))
            .collect::<Vec<_>>();
        while let Some((enclosing, mut c)) = stack.pop() {
            let replies = std::mem::take(&mut c.replies);
            let node = Comment::from_wire(c, enclosing);
            stack.extend(replies.into_iter().rev().map(|r| (Some(node.id.clone()), r)));
            flat.push(node);
        }

        let (roots, dropped) = assemble(flat);
        self.roots = roots;
        if dropped.is_empty() {
            return Ok(());
        }
        tracing::warn!(
            delivery = %self.delivery_id,
            num_dropped = dropped.len(),
            "dropped comments with unresolvable parents"
        );
        Err(Error::InvalidData(format!(
            "unresolvable parent for comments {}",
            dropped
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Appends a new comment authored by the viewer, before the backend has
    /// acknowledged it
    pub fn reply(&mut self, parent_id: Option<&CommentId>, content: &str) -> Result<Comment, Error> {
        api::validate_content(content)?;
        let comment = Comment {
            id: CommentId(format!("local-{}", Uuid::new_v4())),
            parent_id: parent_id.cloned(),
            content: String::from(content),
            author: self.viewer.clone(),
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            user_vote: None,
            children: Vec::new(),
            pending: true,
        };
        match parent_id {
            None => self.roots.push(comment.clone()),
            Some(parent) => {
                let path = self.require(parent)?;
                self.node_mut(&path).children.push(comment.clone());
            }
        }
        Ok(comment)
    }

    /// Casting the vote the viewer already has is a no-op, not a toggle
    pub fn vote(&mut self, id: &CommentId, direction: Vote) -> Result<Comment, Error> {
        let path = self.require(id)?;
        let node = self.node_mut(&path);
        if !node.apply_vote(direction) {
            tracing::debug!(comment = %id, vote = %direction, "vote already cast");
        }
        Ok(node.clone())
    }

    /// Number of parent hops to the comment's root
    pub fn depth_of(&self, id: &CommentId) -> Result<usize, Error> {
        Ok(self.require(id)?.len() - 1)
    }

    pub fn can_reply(&self, id: &CommentId) -> Result<bool, Error> {
        Ok(self.depth_of(id)? < MAX_REPLY_DEPTH)
    }

    /// Pre-order listing for display, replies in insertion order
    pub fn flatten(&self) -> Vec<ThreadEntry<'_>> {
        let mut res = Vec::new();
        let mut stack = self.roots.iter().rev().map(|c| (c, 0)).collect::<Vec<_>>();
        while let Some((comment, depth)) = stack.pop() {
            res.push(ThreadEntry {
                comment,
                depth,
                can_reply: depth < MAX_REPLY_DEPTH,
            });
            stack.extend(comment.children.iter().rev().map(|c| (c, depth + 1)));
        }
        res
    }

    /// Swaps a pending comment for the version the backend stored
    pub fn confirm_reply(&mut self, local_id: &CommentId, stored: api::Comment) -> Result<(), Error> {
        let path = self.require(local_id)?;
        let node = self.node_mut(&path);
        if !node.pending {
            return Err(Error::Validation(format!(
                "comment {local_id} is already confirmed"
            )));
        }
        node.id = stored.id;
        node.content = stored.content;
        node.author = stored.user;
        node.created_at = stored.created_at;
        node.upvotes = stored.upvotes;
        node.downvotes = stored.downvotes;
        node.user_vote = stored.user_vote;
        node.pending = false;
        let id = node.id.clone();
        for child in node.children.iter_mut() {
            child.parent_id = Some(id.clone());
        }
        Ok(())
    }

    /// Rolls back a pending comment; acknowledged comments are never removed
    pub fn retract_pending(&mut self, local_id: &CommentId) -> Result<Comment, Error> {
        let path = self.require(local_id)?;
        if !self.node(&path).pending {
            return Err(Error::Validation(format!(
                "comment {local_id} is already confirmed"
            )));
        }
        let (last, parent) = path.split_last().expect("paths are never empty");
        Ok(match parent.is_empty() {
            true => self.roots.remove(*last),
            false => self.node_mut(parent).children.remove(*last),
        })
    }

    pub fn vote_state(&self, id: &CommentId) -> Result<VoteState, Error> {
        Ok(self.node(&self.require(id)?).vote_state())
    }

    pub fn restore_vote(&mut self, id: &CommentId, state: VoteState) -> Result<(), Error> {
        let path = self.require(id)?;
        let node = self.node_mut(&path);
        node.upvotes = state.upvotes;
        node.downvotes = state.downvotes;
        node.user_vote = state.user_vote;
        Ok(())
    }

    /// Replaces the forest with the backend's, keeping local comments that are
    /// still waiting for acknowledgement
    ///
    /// A pending comment whose parent disappeared from the backend's view is
    /// dropped.
    pub fn reconcile(&mut self, stored: Vec<api::Comment>) -> Result<(), Error> {
        let pending = self
            .flatten()
            .into_iter()
            .filter(|e| e.comment.pending)
            .map(|e| Comment {
                children: Vec::new(),
                ..e.comment.clone()
            })
            .collect::<Vec<_>>();
        let res = self.load_roots(stored);
        for c in pending {
            match &c.parent_id {
                None => self.roots.push(c),
                Some(parent) => match self.path_to(parent) {
                    Some(path) => self.node_mut(&path).children.push(c),
                    None => tracing::warn!(
                        comment = %c.id,
                        parent = %parent,
                        "dropping pending reply whose parent vanished"
                    ),
                },
            }
        }
        res
    }

    fn require(&self, id: &CommentId) -> Result<Vec<usize>, Error> {
        self.path_to(id)
            .ok_or_else(|| Error::NotFound(format!("comment {id}")))
    }

    /// Child indices leading from the roots to the comment
    fn path_to(&self, id: &CommentId) -> Option<Vec<usize>> {
        let mut stack = self
            .roots
            .iter()
            .enumerate()
            .map(|(i, c)| (vec![i], c))
            .collect::<Vec<_>>();
        while let Some((path, c)) = stack.pop() {
            if c.id == *id {
                return Some(path);
            }
            for (i, child) in c.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child_path, child));
            }
        }
        None
    }

    fn node(&self, path: &[usize]) -> &Comment {
        let (first, rest) = path.split_first().expect("paths are never empty");
        rest.iter()
            .fold(&self.roots[*first], |node, i| &node.children[*i])
    }

    fn node_mut(&mut self, path: &[usize]) -> &mut Comment {
        let (first, rest) = path.split_first().expect("paths are never empty");
        let mut node = &mut self.roots[*first];
        for i in rest {
            node = &mut node.children[*i];
        }
        node
    }
}

/// Builds the forest out of comments listed in insertion order, returning the
/// ids that could not be attached
fn assemble(flat: Vec<Comment>) -> (Vec<Comment>, Vec<CommentId>) {
    let mut dropped = Vec::new();
    let mut index = HashMap::with_capacity(flat.len());
    let mut slots = Vec::with_capacity(flat.len());
    for c in flat {
        if index.contains_key(&c.id) {
            dropped.push(c.id);
            continue;
        }
        index.insert(c.id.clone(), slots.len());
        slots.push(Some(c));
    }

    let mut children = vec![Vec::new(); slots.len()];
    let mut roots = Vec::new();
    for (i, c) in slots.iter().enumerate() {
        match c.as_ref().and_then(|c| c.parent_id.as_ref()) {
            None => roots.push(i),
            Some(parent) => match index.get(parent) {
                Some(&p) if p != i => children[p].push(i),
                _ => (),
            },
        }
    }

    // Whatever is not reachable from a root hangs off an unknown parent or a cycle
    let mut order = roots.clone();
    let mut next = 0;
    while next < order.len() {
        let i = order[next];
        next += 1;
        order.extend(children[i].iter().copied());
    }
    let mut reached = vec![false; slots.len()];
    for &i in order.iter() {
        reached[i] = true;
    }
    for (c, reached) in slots.iter().zip(reached.iter()) {
        if let (Some(c), false) = (c, *reached) {
            dropped.push(c.id.clone());
        }
    }

    // Children come after their parent in `order`, so walking it backwards
    // finishes every subtree before it gets moved into its parent
    for &i in order.iter().rev() {
        let kids = children[i]
            .iter()
            .filter_map(|&c| slots[c].take())
            .collect::<Vec<_>>();
        if let Some(node) = slots[i].as_mut() {
            node.children = kids;
        }
    }
    let roots = roots.into_iter().filter_map(|i| slots[i].take()).collect();
    (roots, dropped)
}
