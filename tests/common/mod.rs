//! Shared helpers for ledger integration tests

#![allow(dead_code)]

use std::io;

use quillstate::core::{DeliverResult, Ledger, Tx};
use quillstate::errors::LedgerResult;
use quillstate::handlers::{
    CancelDeleteArticleTaskMsg, ChangeBlogOwnerMsg, CreateArticleMsg, CreateBlogMsg, CreateUserMsg,
    DeleteArticleMsg, Msg,
};
use quillstate::model::{Address, RecordId, UnixTime};
use quillstate::observability::Logger;

pub const NOW: i64 = 1_700_000_000;
pub const HOUR: i64 = 3_600;

/// Keep event lines out of test output
pub fn quiet_logs() {
    Logger::set_writer(Box::new(io::sink()));
}

pub fn new_ledger() -> Ledger {
    quiet_logs();
    Ledger::in_memory().unwrap()
}

pub fn at(secs: i64) -> UnixTime {
    UnixTime::from_secs(secs)
}

pub fn addr(name: &str) -> Address {
    Address::derive(name.as_bytes())
}

pub fn signed(time: i64, signer: Address, msg: Msg) -> Tx {
    Tx::new(at(time), Some(signer), msg)
}

/// Check then Deliver, the way a submitted transaction is applied
pub fn apply(ledger: &mut Ledger, tx: Tx) -> LedgerResult<DeliverResult> {
    ledger.check(&tx)?;
    ledger.deliver(&tx)
}

pub fn create_user(ledger: &mut Ledger, time: i64, username: &str) -> RecordId {
    let msg = Msg::CreateUser(CreateUserMsg {
        username: username.to_string(),
        bio: Some("Ethereum Maximalist".to_string()),
    });
    apply(ledger, Tx::new(at(time), None, msg)).unwrap().id.unwrap()
}

pub fn create_blog(ledger: &mut Ledger, time: i64, owner: Address) -> RecordId {
    let msg = Msg::CreateBlog(CreateBlogMsg {
        title: "insanely good title".to_string(),
        description: "best description in the existence".to_string(),
    });
    apply(ledger, signed(time, owner, msg)).unwrap().id.unwrap()
}

pub fn create_article_msg(blog: RecordId, delete_at: i64) -> Msg {
    Msg::CreateArticle(CreateArticleMsg {
        blog_id: blog,
        title: "insanely good title".to_string(),
        content: "best content in the existence".to_string(),
        delete_at: at(delete_at),
    })
}

pub fn create_article(
    ledger: &mut Ledger,
    time: i64,
    signer: Address,
    blog: RecordId,
    delete_at: i64,
) -> LedgerResult<DeliverResult> {
    apply(ledger, signed(time, signer, create_article_msg(blog, delete_at)))
}

pub fn delete_article(ledger: &mut Ledger, time: i64, signer: Address, article: RecordId) -> LedgerResult<DeliverResult> {
    let msg = Msg::DeleteArticle(DeleteArticleMsg { article_id: article });
    apply(ledger, signed(time, signer, msg))
}

pub fn cancel_deletion(ledger: &mut Ledger, time: i64, signer: Address, article: RecordId) -> LedgerResult<DeliverResult> {
    let msg = Msg::CancelDeleteArticleTask(CancelDeleteArticleTaskMsg { article_id: article });
    apply(ledger, signed(time, signer, msg))
}

pub fn change_owner(
    ledger: &mut Ledger,
    time: i64,
    signer: Address,
    blog: RecordId,
    new_owner: Address,
) -> LedgerResult<DeliverResult> {
    let msg = Msg::ChangeBlogOwner(ChangeBlogOwnerMsg {
        blog_id: blog,
        new_owner: new_owner.to_string(),
    });
    apply(ledger, signed(time, signer, msg))
}
