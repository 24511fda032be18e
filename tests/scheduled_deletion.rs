//! Scheduled article deletion
//!
//! An article created with a deadline owns exactly one live task until the
//! task fires, the owner cancels it, or the owner deletes the article.

mod common;

use common::*;
use quillstate::core::Effect;
use quillstate::handlers::{DeleteArticleMsg, Msg};
use quillstate::scheduler::Task;

#[test]
fn test_deadline_schedules_task_at_exact_time() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);

    let res = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap();
    let article_id = res.id.unwrap();
    let task_id = res.scheduled.expect("deadline must schedule a task");

    let article = ledger.article(article_id).unwrap().unwrap();
    assert_eq!(article.delete_task_id, Some(task_id));
    assert_eq!(article.delete_at, Some(at(NOW + HOUR)));

    let task = ledger.task(task_id).unwrap().unwrap();
    assert_eq!(
        task,
        Task {
            run_at: at(NOW + HOUR),
            msg: Msg::DeleteArticle(DeleteArticleMsg { article_id }),
        }
    );
    assert_eq!(ledger.pending_tasks(), 1);
}

#[test]
fn test_no_deadline_schedules_nothing() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);

    let res = create_article(&mut ledger, NOW, owner, blog, 0).unwrap();
    assert!(res.scheduled.is_none());
    assert!(ledger.article(res.id.unwrap()).unwrap().unwrap().delete_task_id.is_none());
    assert_eq!(ledger.pending_tasks(), 0);
}

#[test]
fn test_past_deadline_rejected_and_nothing_stored() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);

    let err = create_article(&mut ledger, NOW, owner, blog, NOW - 1).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.field(), Some("delete_at"));

    assert!(ledger.articles_of_blog(blog).unwrap().is_empty());
    assert_eq!(ledger.pending_tasks(), 0);
}

#[test]
fn test_task_fires_and_removes_article() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let res = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap();
    let article_id = res.id.unwrap();

    let early = ledger.tick(at(NOW + HOUR - 1)).unwrap();
    assert!(early.fired.is_empty());
    assert!(ledger.article(article_id).unwrap().is_some());

    let report = ledger.tick(at(NOW + HOUR)).unwrap();
    assert_eq!(report.fired.len(), 1);
    assert!(report.fired[0].succeeded);
    assert_eq!(report.fired[0].task_id, res.scheduled.unwrap());
    assert_eq!(report.pending, 0);

    assert!(ledger.must_article(article_id).unwrap_err().is_not_found());
    assert!(ledger.articles_of_blog(blog).unwrap().is_empty());
    assert!(ledger.articles_by_time(blog).unwrap().is_empty());
}

#[test]
fn test_cancel_keeps_article() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let res = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap();
    let article_id = res.id.unwrap();

    let cancelled = cancel_deletion(&mut ledger, NOW + 1, owner, article_id).unwrap();
    assert_eq!(cancelled.cancelled, res.scheduled);

    let article = ledger.article(article_id).unwrap().unwrap();
    assert!(article.delete_task_id.is_none());
    assert_eq!(ledger.pending_tasks(), 0);
}

#[test]
fn test_cancel_then_fire_never_deletes() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let article_id = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap().id.unwrap();

    cancel_deletion(&mut ledger, NOW + 1, owner, article_id).unwrap();
    let report = ledger.tick(at(NOW + 2 * HOUR)).unwrap();

    assert!(report.fired.is_empty());
    assert!(ledger.article(article_id).unwrap().is_some());
}

#[test]
fn test_cancel_without_task_is_not_found() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let article_id = create_article(&mut ledger, NOW, owner, blog, 0).unwrap().id.unwrap();

    assert!(cancel_deletion(&mut ledger, NOW, owner, article_id).unwrap_err().is_not_found());
}

#[test]
fn test_cancel_by_stranger_rejected() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let article_id = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap().id.unwrap();

    let err = cancel_deletion(&mut ledger, NOW, addr("stranger"), article_id).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(ledger.pending_tasks(), 1);
}

#[test]
fn test_owner_delete_then_deadline_is_quiet() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let res = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap();
    let article_id = res.id.unwrap();

    let deleted = delete_article(&mut ledger, NOW + 1, owner, article_id).unwrap();
    assert_eq!(deleted.effect, Effect::Deleted);
    assert_eq!(deleted.cancelled, res.scheduled);

    let report = ledger.tick(at(NOW + HOUR)).unwrap();
    assert!(report.fired.is_empty());
    assert_eq!(ledger.metrics().tasks_failed, 0);
}

#[test]
fn test_system_route_not_reachable_by_signers() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);
    let article_id = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap().id.unwrap();

    // a signed delete goes through the owner route and is checked for ownership
    let err = delete_article(&mut ledger, NOW, addr("stranger"), article_id).unwrap_err();
    assert!(err.is_unauthorized());
    assert!(ledger.article(article_id).unwrap().is_some());
}

#[test]
fn test_due_tasks_fire_in_deadline_order() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    let blog = create_blog(&mut ledger, NOW, owner);

    let late = create_article(&mut ledger, NOW, owner, blog, NOW + 3 * HOUR).unwrap();
    let early = create_article(&mut ledger, NOW, owner, blog, NOW + HOUR).unwrap();
    let middle = create_article(&mut ledger, NOW, owner, blog, NOW + 2 * HOUR).unwrap();

    let report = ledger.tick(at(NOW + 3 * HOUR)).unwrap();
    let order: Vec<_> = report.fired.iter().map(|o| o.task_id).collect();
    assert_eq!(
        order,
        vec![early.scheduled.unwrap(), middle.scheduled.unwrap(), late.scheduled.unwrap()]
    );
    assert!(ledger.articles_of_blog(blog).unwrap().is_empty());

    let metrics = ledger.metrics();
    assert_eq!(metrics.tasks_scheduled, 3);
    assert_eq!(metrics.tasks_fired, 3);
    assert_eq!(metrics.records_deleted, 3);
}

#[test]
fn test_tick_before_last_transition_rejected() {
    let mut ledger = new_ledger();
    let owner = addr("owner");
    create_blog(&mut ledger, NOW, owner);

    let err = ledger.tick(at(NOW - 1)).unwrap_err();
    assert_eq!(err.field(), Some("time"));
}
