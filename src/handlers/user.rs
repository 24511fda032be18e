use crate::core::{CheckResult, Context, DeliverResult, Handler};
use crate::errors::LedgerResult;
use crate::model::User;
use crate::storage::KvStore;

use super::buckets::UserBucket;
use super::msg::{Msg, CREATE_USER_PATH};
use super::{wrong_msg, CREATE_USER_COST};

/// Registers a user profile. Any caller may register.
pub struct CreateUserHandler {
    users: UserBucket,
}

impl CreateUserHandler {
    pub fn new() -> Self {
        Self {
            users: UserBucket::new(),
        }
    }

    fn validate(&self, ctx: &Context, msg: &Msg) -> LedgerResult<User> {
        let Msg::CreateUser(msg) = msg else {
            return Err(wrong_msg(CREATE_USER_PATH, msg));
        };
        msg.validate()?;

        Ok(User {
            username: msg.username.clone(),
            bio: msg.bio().map(str::to_string),
            registered_at: ctx.time,
        })
    }
}

impl Default for CreateUserHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CreateUserHandler {
    fn check(&self, ctx: &Context, _store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, msg)?;
        Ok(CheckResult {
            cost: CREATE_USER_COST,
        })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let user = self.validate(ctx, msg)?;
        let id = self.users.create(store, user)?;
        Ok(DeliverResult::created(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::CreateUserMsg;
    use crate::model::UnixTime;
    use crate::storage::MemStore;

    fn create(username: &str, bio: Option<&str>) -> Msg {
        Msg::CreateUser(CreateUserMsg {
            username: username.to_string(),
            bio: bio.map(str::to_string),
        })
    }

    #[test]
    fn test_registered_at_is_transition_time() {
        let handler = CreateUserHandler::new();
        let mut store = MemStore::new();
        let ctx = Context::signed(UnixTime::from_secs(1_000), None);

        let res = handler
            .deliver(&ctx, &mut store, &create("Crpto0X", Some("Best hacker in the universe")))
            .unwrap();
        let user = UserBucket::new().must_get(&store, res.id.unwrap()).unwrap();
        assert_eq!(user.registered_at, UnixTime::from_secs(1_000));
        assert_eq!(user.bio.as_deref(), Some("Best hacker in the universe"));
    }

    #[test]
    fn test_check_costs_and_writes_nothing() {
        let handler = CreateUserHandler::new();
        let store = MemStore::new();
        let ctx = Context::signed(UnixTime::from_secs(1_000), None);

        let res = handler.check(&ctx, &store, &create("Crpto0X", None)).unwrap();
        assert_eq!(res.cost, CREATE_USER_COST);
        assert!(store.is_empty());
    }

    #[test]
    fn test_bad_username_rejected() {
        let handler = CreateUserHandler::new();
        let mut store = MemStore::new();
        let ctx = Context::signed(UnixTime::from_secs(1_000), None);

        let err = handler.deliver(&ctx, &mut store, &create("ab", None)).unwrap_err();
        assert_eq!(err.field(), Some("username"));
        assert!(store.is_empty());
    }
}
