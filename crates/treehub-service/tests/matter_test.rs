//! Tree mutation engine tests over the in-memory repository and a
//! temp-dir matter root.

mod helpers;

use std::time::Duration;

use treehub_core::ErrorKind;
use treehub_database::MatterRepository;
use treehub_entity::matter::{MATTER_ROOT, Matter, MatterFilter, MatterKind};
use treehub_entity::user::User;
use uuid::Uuid;

use helpers::{StubFetcher, TestContext, stream_of, user};

#[tokio::test]
async fn test_create_directory_once_per_name() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let docs = ctx.mkdir(&alice, &root, "docs").await;
    assert_eq!(docs.parent_id, MATTER_ROOT);
    assert_eq!(docs.relative_path, "/docs");
    assert!(!docs.privacy);
    ctx.assert_materialized(&docs);

    let err = ctx
        .service
        .atomic_create_directory(&root, "docs", &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(ctx.repo.len().await, 1);
}

#[tokio::test]
async fn test_create_directory_validation() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    for bad in ["", "   ", "a/b", "a\\b", "a*b", "what?"] {
        let err = ctx
            .service
            .atomic_create_directory(&root, bad, &alice)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{bad:?}");
    }

    let long = "n".repeat(201);
    let err = ctx
        .service
        .atomic_create_directory(&root, &long, &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let trimmed = ctx.mkdir(&alice, &root, "  spaced  ").await;
    assert_eq!(trimmed.name, "spaced");

    let bob = user("bob");
    let err = ctx
        .service
        .atomic_create_directory(&trimmed, "x", &bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(ctx.repo.len().await, 1);
}

#[tokio::test]
async fn test_depth_limit() {
    let ctx = TestContext::new().await;
    let alice = user("alice");

    let path = "/d".repeat(32);
    let deepest = ctx
        .service
        .atomic_create_directories(&alice, &path)
        .await
        .unwrap();
    assert_eq!(deepest.depth(), 32);

    let err = ctx
        .service
        .atomic_create_directory(&deepest, "one-more", &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = ctx
        .service
        .atomic_create_directories(&alice, &format!("{path}/d"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_upload_records_observed_size() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let docs = ctx.mkdir(&alice, &Matter::root(&alice), "docs").await;

    let file = ctx.upload(&alice, &docs, "hello.txt", b"hello world").await;
    assert_eq!(file.size, 11);
    assert_eq!(file.relative_path, "/docs/hello.txt");
    assert!(!file.is_directory);
    assert!(file.content_hash.is_none());
    ctx.assert_materialized(&file);
    assert_eq!(std::fs::read(ctx.disk_path(&file)).unwrap(), b"hello world");

    let err = ctx
        .service
        .atomic_upload(stream_of(b"again"), &alice, &docs, "hello.txt", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(std::fs::read(ctx.disk_path(&file)).unwrap(), b"hello world");
}

#[tokio::test]
async fn test_upload_removes_stale_file() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let stale = ctx.service.paths().user_root("alice").join("orphan.txt");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, b"leftover bytes from a crash").unwrap();

    let file = ctx.upload(&alice, &root, "orphan.txt", b"fresh").await;
    assert_eq!(file.size, 5);
    assert_eq!(std::fs::read(&stale).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_upload_over_quota_leaves_nothing() {
    let ctx = TestContext::new().await;
    let limited = User::new(Uuid::new_v4(), "limited", 10);
    let root = Matter::root(&limited);

    let err = ctx
        .service
        .atomic_upload(stream_of(&[7u8; 11]), &limited, &root, "big.bin", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert!(ctx.repo.is_empty().await);
    assert!(!ctx.service.paths().user_root("limited").join("big.bin").exists());

    let ok = ctx.upload(&limited, &root, "fits.bin", &[7u8; 10]).await;
    assert_eq!(ok.size, 10);
}

#[tokio::test]
async fn test_quota_scenario_with_overwrite() {
    let ctx = TestContext::new().await;
    let carol = User::new(Uuid::new_v4(), "carol", 1000);
    let root = Matter::root(&carol);

    let first = ctx.upload(&carol, &root, "a.txt", &[1u8; 500]).await;
    assert_eq!(first.size, 500);

    let err = ctx
        .service
        .atomic_upload(stream_of(&[2u8; 300]), &carol, &root, "a.txt", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = ctx
        .service
        .handle_overwrite(carol.id, "/a.txt", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let replaced = {
        let _guard = ctx.service.locks().acquire(carol.id).await;
        ctx.service
            .handle_overwrite(carol.id, "/a.txt", true)
            .await
            .unwrap();
        ctx.service
            .upload(stream_of(&[2u8; 300]), &carol, &root, "a.txt", false)
            .await
            .unwrap()
    };

    assert_ne!(replaced.id, first.id);
    assert_eq!(replaced.size, 300);
    assert!(ctx.repo.find_by_id(first.id).await.unwrap().is_none());
    assert_eq!(ctx.repo.len().await, 1);
    assert_eq!(std::fs::read(ctx.disk_path(&replaced)).unwrap(), vec![2u8; 300]);
}

#[tokio::test]
async fn test_move_directory_restamps_descendants() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;
    let c = ctx.mkdir(&alice, &b, "c").await;
    let f = ctx.upload(&alice, &c, "f.txt", b"deep").await;
    let target = ctx.mkdir(&alice, &root, "t").await;
    ctx.cache_image(&f).await;

    let moved = ctx.service.atomic_move(&a, &target, false).await.unwrap();
    assert_eq!(moved.parent_id, target.id);
    assert_eq!(moved.relative_path, "/t/a");

    let b = ctx.reload(&b).await;
    let c = ctx.reload(&c).await;
    let f = ctx.reload(&f).await;
    assert_eq!(b.relative_path, format!("{}/b", moved.relative_path));
    assert_eq!(c.relative_path, format!("{}/c", b.relative_path));
    assert_eq!(f.relative_path, format!("{}/f.txt", c.relative_path));
    for m in [&moved, &b, &c, &f] {
        ctx.assert_materialized(m);
    }
    assert!(!ctx.service.paths().user_root("alice").join("a").exists());
    assert!(!ctx.has_cached_image(&f).await);
}

#[tokio::test]
async fn test_move_into_self_or_descendant_is_rejected() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;

    for dest in [&a, &b] {
        let err = ctx.service.atomic_move(&a, dest, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    assert_eq!(ctx.reload(&a).await, a);
    assert_eq!(ctx.reload(&b).await, b);
    ctx.assert_materialized(&a);
    ctx.assert_materialized(&b);
}

#[tokio::test]
async fn test_move_file_and_overwrite_policy() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let inbox = ctx.mkdir(&alice, &root, "inbox").await;
    let archive = ctx.mkdir(&alice, &root, "archive").await;
    let incoming = ctx.upload(&alice, &inbox, "report.pdf", b"new").await;
    let existing = ctx.upload(&alice, &archive, "report.pdf", b"old").await;
    ctx.cache_image(&incoming).await;
    ctx.cache_image(&existing).await;

    let err = ctx
        .service
        .atomic_move(&incoming, &archive, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(ctx.reload(&incoming).await.parent_id, inbox.id);
    assert!(ctx.has_cached_image(&incoming).await);

    let moved = ctx
        .service
        .atomic_move(&incoming, &archive, true)
        .await
        .unwrap();
    assert_eq!(moved.id, incoming.id);
    assert_eq!(moved.relative_path, "/archive/report.pdf");
    ctx.assert_materialized(&moved);
    assert_eq!(std::fs::read(ctx.disk_path(&moved)).unwrap(), b"new");
    assert!(ctx.repo.find_by_id(existing.id).await.unwrap().is_none());
    assert!(!ctx.has_cached_image(&incoming).await);
    assert!(!ctx.has_cached_image(&existing).await);
}

#[tokio::test]
async fn test_move_into_current_parent_is_a_no_op() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let file = ctx.upload(&alice, &root, "stay.txt", b"x").await;

    let same = ctx.service.atomic_move(&file, &root, true).await.unwrap();
    assert_eq!(same, file);
    ctx.assert_materialized(&same);
}

#[tokio::test]
async fn test_move_batch_checks_every_item_first() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let inner = ctx.mkdir(&alice, &a, "inner").await;
    let loose = ctx.upload(&alice, &root, "loose.txt", b"1").await;

    let err = ctx
        .service
        .atomic_move_batch(&[loose.clone(), a.clone()], &inner)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(ctx.reload(&loose).await.parent_id, MATTER_ROOT);

    let target = ctx.mkdir(&alice, &root, "target").await;
    let moved = ctx
        .service
        .atomic_move_batch(&[loose.clone(), a.clone()], &target)
        .await
        .unwrap();
    assert_eq!(moved.len(), 2);
    assert_eq!(ctx.reload(&loose).await.relative_path, "/target/loose.txt");
    assert_eq!(ctx.reload(&inner).await.relative_path, "/target/a/inner");
}

#[tokio::test]
async fn test_move_respects_depth_limit() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let deep = ctx
        .service
        .atomic_create_directories(&alice, &"/d".repeat(31))
        .await
        .unwrap();
    let a = ctx.mkdir(&alice, &root, "a").await;
    ctx.mkdir(&alice, &a, "b").await;

    let err = ctx.service.atomic_move(&a, &deep, false).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(ctx.reload(&a).await.parent_id, MATTER_ROOT);
}

#[tokio::test]
async fn test_files_do_not_count_toward_depth() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let deepest = ctx
        .service
        .atomic_create_directories(&alice, &"/d".repeat(32))
        .await
        .unwrap();
    let file = ctx.upload(&alice, &root, "f.txt", b"f").await;
    let moved = ctx.service.atomic_move(&file, &deepest, false).await.unwrap();
    assert_eq!(moved.parent_id, deepest.id);
    ctx.assert_materialized(&moved);

    let other = ctx.upload(&alice, &root, "g.txt", b"g").await;
    let copy = ctx
        .service
        .atomic_copy(&other, &deepest, "g.txt", false)
        .await
        .unwrap();
    assert_eq!(copy.parent_id, deepest.id);
    ctx.assert_materialized(&copy);

    let deep = ctx
        .service
        .find_by_path(&alice, &"/d".repeat(31))
        .await
        .unwrap();
    let a = ctx.mkdir(&alice, &root, "a").await;
    let inside = ctx.upload(&alice, &a, "x.txt", b"x").await;
    let moved = ctx.service.atomic_move(&a, &deep, false).await.unwrap();
    assert_eq!(moved.depth(), 32);
    let inside = ctx.reload(&inside).await;
    assert_eq!(inside.relative_path, format!("{}/a/x.txt", "/d".repeat(31)));
    ctx.assert_materialized(&inside);
}

#[tokio::test]
async fn test_move_batch_with_parent_and_child() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;
    let t = ctx.mkdir(&alice, &root, "t").await;

    let moved = ctx
        .service
        .atomic_move_batch(&[a.clone(), b.clone()], &t)
        .await
        .unwrap();
    assert_eq!(moved.len(), 2);

    let a = ctx.reload(&a).await;
    let b = ctx.reload(&b).await;
    assert_eq!(a.relative_path, "/t/a");
    assert_eq!(b.relative_path, "/t/b");
    assert_eq!(b.parent_id, t.id);
    ctx.assert_materialized(&a);
    ctx.assert_materialized(&b);
}

#[tokio::test]
async fn test_copy_creates_independent_tree() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let src = ctx.mkdir(&alice, &root, "src").await;
    let sub = ctx.mkdir(&alice, &src, "sub").await;
    let file = ctx.upload(&alice, &sub, "data.bin", b"payload").await;

    let copy = ctx
        .service
        .atomic_copy(&src, &root, "copy", false)
        .await
        .unwrap();
    assert_ne!(copy.id, src.id);
    assert_eq!(copy.relative_path, "/copy");
    assert_eq!(copy.privacy, src.privacy);
    ctx.assert_materialized(&copy);

    let copied_sub = ctx
        .service
        .find_by_path(&alice, "/copy/sub")
        .await
        .unwrap();
    let copied_file = ctx
        .service
        .find_by_path(&alice, "/copy/sub/data.bin")
        .await
        .unwrap();
    assert_ne!(copied_sub.id, sub.id);
    assert_ne!(copied_file.id, file.id);
    assert_eq!(copied_file.parent_id, copied_sub.id);
    assert_eq!(copied_file.size, file.size);
    assert!(copied_file.content_hash.is_none());
    assert_eq!(std::fs::read(ctx.disk_path(&copied_file)).unwrap(), b"payload");

    ctx.service
        .atomic_rename(&copied_file, "changed.bin", &alice)
        .await
        .unwrap();
    assert_eq!(ctx.reload(&file).await, file);
    ctx.assert_materialized(&file);
}

#[tokio::test]
async fn test_copy_into_own_descendant_is_rejected() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;

    let err = ctx
        .service
        .atomic_copy(&a, &b, "a", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(ctx.repo.len().await, 2);
}

#[tokio::test]
async fn test_copy_overwrite_applies_at_top_level() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let file = ctx.upload(&alice, &root, "a.txt", b"aaa").await;
    let old = ctx.upload(&alice, &root, "b.txt", b"bbb").await;

    let err = ctx
        .service
        .atomic_copy(&file, &root, "b.txt", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let copy = ctx
        .service
        .atomic_copy(&file, &root, "b.txt", true)
        .await
        .unwrap();
    assert!(ctx.repo.find_by_id(old.id).await.unwrap().is_none());
    assert_eq!(std::fs::read(ctx.disk_path(&copy)).unwrap(), b"aaa");

    let err = ctx
        .service
        .atomic_copy(&file, &root, "a.txt", true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    ctx.assert_materialized(&file);
}

#[tokio::test]
async fn test_rename() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;
    let f = ctx.upload(&alice, &b, "f.txt", b"f").await;
    ctx.mkdir(&alice, &root, "taken").await;

    let err = ctx.service.atomic_rename(&a, "a", &alice).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let err = ctx
        .service
        .atomic_rename(&a, "taken", &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let err = ctx
        .service
        .atomic_rename(&a, "bad|name", &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let renamed = ctx.service.atomic_rename(&a, "z", &alice).await.unwrap();
    assert_eq!(renamed.relative_path, "/z");
    let b = ctx.reload(&b).await;
    let f = ctx.reload(&f).await;
    assert_eq!(b.relative_path, "/z/b");
    assert_eq!(f.relative_path, "/z/b/f.txt");
    for m in [&renamed, &b, &f] {
        ctx.assert_materialized(m);
    }
}

#[tokio::test]
async fn test_rename_file_invalidates_image_cache() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let photo = ctx.upload(&alice, &root, "photo.png", b"png").await;
    ctx.cache_image(&photo).await;

    let renamed = ctx
        .service
        .atomic_rename(&photo, "holiday.png", &alice)
        .await
        .unwrap();
    assert_eq!(renamed.relative_path, "/holiday.png");
    assert!(!ctx.has_cached_image(&photo).await);
    ctx.assert_materialized(&renamed);
}

#[tokio::test]
async fn test_create_directories_by_path_is_idempotent() {
    let ctx = TestContext::new().await;
    let alice = user("alice");

    let z = ctx
        .service
        .atomic_create_directories(&alice, "/x/y/z")
        .await
        .unwrap();
    assert_eq!(z.relative_path, "/x/y/z");
    for path in ["/x", "/x/y", "/x/y/z"] {
        let m = ctx.service.find_by_path(&alice, path).await.unwrap();
        assert!(m.is_directory);
        ctx.assert_materialized(&m);
    }

    let again = ctx
        .service
        .atomic_create_directories(&alice, "/x/y/z/")
        .await
        .unwrap();
    assert_eq!(again.id, z.id);
    assert_eq!(ctx.repo.len().await, 3);

    let root = ctx
        .service
        .atomic_create_directories(&alice, "/")
        .await
        .unwrap();
    assert!(root.is_root());

    for bad in ["x/y", "/x//y", "/x/y>"] {
        let err = ctx
            .service
            .atomic_create_directories(&alice, bad)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{bad}");
    }
}

#[tokio::test]
async fn test_crawl() {
    let fetcher = StubFetcher::default().with("https://example.com/logo.png", b"remote bytes");
    let ctx = TestContext::with_fetcher(fetcher).await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let err = ctx
        .service
        .atomic_crawl("ftp://example.com/x", "x", &alice, &root, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = ctx
        .service
        .atomic_crawl("https://example.com/missing", "m", &alice, &root, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(ctx.repo.is_empty().await);

    let logo = ctx
        .service
        .atomic_crawl("https://example.com/logo.png", "logo.png", &alice, &root, true)
        .await
        .unwrap();
    assert_eq!(logo.size, 12);
    assert!(logo.privacy);
    ctx.assert_materialized(&logo);
}

#[tokio::test]
async fn test_delete_directory_recursively() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);
    let a = ctx.mkdir(&alice, &root, "a").await;
    let b = ctx.mkdir(&alice, &a, "b").await;
    let f1 = ctx.upload(&alice, &a, "1.png", b"1").await;
    let f2 = ctx.upload(&alice, &b, "2.png", b"2").await;
    let keep = ctx.upload(&alice, &root, "keep.txt", b"k").await;
    ctx.cache_image(&f1).await;
    ctx.cache_image(&f2).await;

    let removed = ctx.service.atomic_delete(&a).await.unwrap();
    assert_eq!(removed, 4);
    assert_eq!(ctx.repo.len().await, 1);
    assert!(!ctx.disk_path(&a).exists());
    assert!(!ctx.has_cached_image(&f1).await);
    assert!(!ctx.has_cached_image(&f2).await);
    ctx.assert_materialized(&keep);

    let err = ctx.service.atomic_delete(&a).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = ctx.service.atomic_delete(&root).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_find_list_and_detail() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let bob = user("bob");
    let root = Matter::root(&alice);
    let docs = ctx.mkdir(&alice, &root, "docs").await;
    let year = ctx.mkdir(&alice, &docs, "2024").await;
    let report = ctx.upload(&alice, &year, "Report.pdf", b"r").await;
    ctx.upload(&alice, &year, "notes.txt", b"n").await;
    ctx.mkdir(&alice, &year, "drafts").await;
    ctx.mkdir(&bob, &Matter::root(&bob), "docs").await;

    assert!(ctx.service.find_by_path(&alice, "/").await.unwrap().is_root());
    let found = ctx.service.find_by_path(&alice, "/docs/2024/").await.unwrap();
    assert_eq!(found.id, year.id);
    let err = ctx.service.find_by_path(&alice, "/nope").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let all = ctx
        .service
        .list(&alice, &year, &MatterFilter::all())
        .await
        .unwrap();
    let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["drafts", "Report.pdf", "notes.txt"]);

    let files = MatterFilter {
        kind: MatterKind::File,
        name_contains: Some("report".into()),
    };
    let only = ctx.service.list(&alice, &year, &files).await.unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].id, report.id);

    let top = ctx
        .service
        .list(&alice, &root, &MatterFilter::all())
        .await
        .unwrap();
    assert_eq!(top.len(), 1);

    let detail = ctx.service.detail(report.id).await.unwrap();
    assert_eq!(detail.matter.id, report.id);
    let chain: Vec<_> = detail.ancestors.iter().map(|m| m.id).collect();
    assert_eq!(chain, vec![docs.id, year.id]);
}

#[tokio::test]
async fn test_concurrent_creates_for_one_user() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = ctx.service.clone();
        let alice = alice.clone();
        let root = root.clone();
        tasks.push(tokio::spawn(async move {
            service
                .atomic_create_directory(&root, "shared", &alice)
                .await
        }));
    }

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::Conflict),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(ctx.repo.len().await, 1);
}

#[tokio::test]
async fn test_atomic_operation_waits_for_lock() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let bob = user("bob");

    let guard = ctx.service.locks().acquire(alice.id).await;

    let blocked = {
        let service = ctx.service.clone();
        let alice = alice.clone();
        tokio::spawn(async move { service.atomic_create_directories(&alice, "/later").await })
    };

    // Another user is unaffected.
    tokio::time::timeout(
        Duration::from_secs(5),
        ctx.service.atomic_create_directories(&bob, "/now"),
    )
    .await
    .expect("bob should not wait for alice's lock")
    .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());
    assert!(ctx.service.find_by_path(&alice, "/later").await.is_err());

    guard.release();
    let later = blocked.await.unwrap().unwrap();
    assert_eq!(later.relative_path, "/later");
    assert!(!ctx.service.locks().is_locked(alice.id));
}

#[tokio::test]
async fn test_lock_released_after_failure() {
    let ctx = TestContext::new().await;
    let alice = user("alice");
    let root = Matter::root(&alice);

    let err = ctx
        .service
        .atomic_create_directory(&root, "bad/name", &alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!ctx.service.locks().is_locked(alice.id));
    ctx.mkdir(&alice, &root, "fine").await;
}
