use crate::{
    api::{CommentId, DataSource, Error, NewComment, Vote},
    Comment, CommentTree,
};

impl CommentTree {
    /// Reloads the thread from the backend, keeping replies still in flight
    ///
    /// `InvalidData` means the thread did load, minus the comments it lists;
    /// any other error leaves the tree as it was.
    pub async fn refresh<S: DataSource + ?Sized>(&mut self, source: &S) -> Result<(), Error> {
        let stored = source.fetch_comments(self.delivery_id()).await?;
        self.reconcile(stored)
    }

    /// Shows the reply right away, then confirms or rolls it back depending on
    /// what the backend answers
    pub async fn submit_reply<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        parent_id: Option<&CommentId>,
        content: &str,
    ) -> Result<Comment, Error> {
        if let Some(parent) = parent_id {
            if self.get(parent).map(|p| p.pending).unwrap_or(false) {
                return Err(Error::Validation(format!(
                    "comment {parent} is not stored yet"
                )));
            }
        }
        let local = self.reply(parent_id, content)?;
        let request = NewComment {
            content: local.content.clone(),
            parent_id: parent_id.cloned(),
        };
        match source.post_reply(self.delivery_id(), &request).await {
            Ok(stored) => {
                let id = stored.id.clone();
                self.confirm_reply(&local.id, stored)?;
                tracing::debug!(delivery = %self.delivery_id(), comment = %id, "reply stored");
                self.get(&id)
                    .cloned()
                    .ok_or_else(|| Error::NotFound(format!("comment {id}")))
            }
            Err(e) => {
                tracing::warn!(delivery = %self.delivery_id(), error = %e, "failed posting reply");
                self.retract_pending(&local.id)?;
                Err(e)
            }
        }
    }

    /// Applies the vote locally and posts it, restoring the previous counters
    /// if the backend refuses
    ///
    /// Once posted, the thread is reloaded to pick up the authoritative
    /// counters. If only that reload fails, the local counters are kept.
    pub async fn submit_vote<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        id: &CommentId,
        direction: Vote,
    ) -> Result<Comment, Error> {
        let before = self.vote_state(id)?;
        if before.user_vote == Some(direction) {
            return self.vote(id, direction);
        }
        if self.get(id).map(|c| c.pending).unwrap_or(false) {
            return Err(Error::Validation(format!("comment {id} is not stored yet")));
        }
        let updated = self.vote(id, direction)?;
        if let Err(e) = source.post_vote(id, direction).await {
            tracing::warn!(comment = %id, vote = %direction, error = %e, "failed posting vote");
            self.restore_vote(id, before)?;
            return Err(e);
        }
        if let Err(e) = self.refresh(source).await {
            tracing::warn!(comment = %id, error = %e, "failed reloading thread after vote");
        }
        Ok(self.get(id).cloned().unwrap_or(updated))
    }
}
