use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::Mutex;

use threadline_persist::{
    AuthorSelection, CreateThreadParams, ErrorKind, MemoryThreadStore, PageRequest,
    PathRevalidator, PersistError, Reference, ThreadActions, ThreadDoc, ThreadStore, UserDoc,
};

#[derive(Default)]
struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    async fn paths(&self) -> Vec<String> {
        self.paths.lock().await.clone()
    }
}

#[async_trait]
impl PathRevalidator for RecordingRevalidator {
    async fn revalidate_path(&self, path: &str) {
        self.paths.lock().await.push(path.to_string());
    }
}

/// Delegates to a memory store but fails the dependent `$push` writes.
struct FailingPushStore {
    inner: MemoryThreadStore,
}

#[async_trait]
impl ThreadStore for FailingPushStore {
    async fn insert_thread(&self, thread: &ThreadDoc) -> threadline_persist::error::Result<()> {
        self.inner.insert_thread(thread).await
    }

    async fn find_thread(&self, id: ObjectId) -> threadline_persist::error::Result<Option<ThreadDoc>> {
        self.inner.find_thread(id).await
    }

    async fn find_threads(&self, ids: &[ObjectId]) -> threadline_persist::error::Result<Vec<ThreadDoc>> {
        self.inner.find_threads(ids).await
    }

    async fn find_top_level(&self, page: PageRequest) -> threadline_persist::error::Result<Vec<ThreadDoc>> {
        self.inner.find_top_level(page).await
    }

    async fn count_top_level(&self) -> threadline_persist::error::Result<u64> {
        self.inner.count_top_level().await
    }

    async fn push_child(&self, _parent: ObjectId, _child: ObjectId) -> threadline_persist::error::Result<()> {
        Err(PersistError::Connection("connection reset".to_string()))
    }

    async fn delete_thread(&self, id: ObjectId) -> threadline_persist::error::Result<()> {
        self.inner.delete_thread(id).await
    }

    async fn push_user_thread(&self, _user: ObjectId, _thread: ObjectId) -> threadline_persist::error::Result<()> {
        Err(PersistError::Connection("connection reset".to_string()))
    }

    async fn find_users(
        &self,
        ids: &[ObjectId],
        selection: AuthorSelection,
    ) -> threadline_persist::error::Result<Vec<UserDoc>> {
        self.inner.find_users(ids, selection).await
    }

    async fn ping(&self) -> threadline_persist::error::Result<()> {
        self.inner.ping().await
    }
}

fn setup() -> (MemoryThreadStore, Arc<RecordingRevalidator>, ThreadActions) {
    let store = MemoryThreadStore::new();
    let revalidator = Arc::new(RecordingRevalidator::default());
    let actions = ThreadActions::new(Arc::new(store.clone()), revalidator.clone());
    (store, revalidator, actions)
}

fn create_params(text: &str, author: ObjectId, path: &str) -> CreateThreadParams {
    CreateThreadParams {
        text: text.to_string(),
        author: author.to_hex(),
        community_id: None,
        path: path.to_string(),
    }
}

async fn seed_thread(store: &MemoryThreadStore, text: &str, author: ObjectId, offset_secs: i64) -> ObjectId {
    let mut thread = ThreadDoc::new(text, author);
    thread.created_at = thread.created_at + chrono::Duration::seconds(offset_secs);
    store.insert_thread(&thread).await.unwrap();
    thread.id
}

#[tokio::test]
async fn test_create_thread_records_on_author() {
    let (store, revalidator, actions) = setup();
    let author = store.insert_user(UserDoc::new("ada", "Ada")).await;

    let mut params = create_params("hello", author, "/");
    params.community_id = Some("65a1b2c3d4e5f60718293a4b".to_string());
    actions.create_thread(params).await.unwrap();

    let threads = store.all_threads().await;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].text, "hello");
    assert_eq!(threads[0].community, None);
    assert!(threads[0].is_top_level());

    let user = store.get_user(author).await.unwrap();
    assert_eq!(user.threads, vec![threads[0].id]);
    assert_eq!(revalidator.paths().await, vec!["/".to_string()]);
}

#[tokio::test]
async fn test_create_thread_for_unknown_author_leaves_no_thread() {
    let (store, revalidator, actions) = setup();

    let err = actions
        .create_thread(create_params("hello", ObjectId::new(), "/"))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Error creating thread: User not found"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.thread_count().await, 0);
    assert!(revalidator.paths().await.is_empty());
}

#[tokio::test]
async fn test_create_thread_rejects_malformed_author() {
    let (store, _, actions) = setup();

    let err = actions
        .create_thread(CreateThreadParams {
            text: "hello".to_string(),
            author: "not-an-id".to_string(),
            community_id: None,
            path: "/".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(store.thread_count().await, 0);
}

#[tokio::test]
async fn test_create_thread_undoes_insert_when_user_update_fails() {
    let inner = MemoryThreadStore::new();
    let author = inner.insert_user(UserDoc::new("ada", "Ada")).await;
    let actions = ThreadActions::new(
        Arc::new(FailingPushStore { inner: inner.clone() }),
        Arc::new(RecordingRevalidator::default()),
    );

    let err = actions
        .create_thread(create_params("hello", author, "/"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
    assert_eq!(inner.thread_count().await, 0);
}

#[tokio::test]
async fn test_fetch_posts_only_top_level_newest_first() {
    let (store, _, actions) = setup();
    let author = store.insert_user(UserDoc::new("ada", "Ada")).await;
    let older = seed_thread(&store, "older", author, 0).await;
    let newer = seed_thread(&store, "newer", author, 10).await;
    actions
        .add_comment_to_thread(&older.to_hex(), "a reply", &author.to_hex(), "/")
        .await
        .unwrap();

    let page = actions.fetch_posts(1, 20).await.unwrap();

    let ids: Vec<String> = page.posts.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![newer.to_hex(), older.to_hex()]);
    assert!(page.posts.iter().all(|p| p.parent_id.is_none()));
    assert!(!page.is_next);
}

#[tokio::test]
async fn test_fetch_posts_populates_authors() {
    let (store, _, actions) = setup();
    let mut ada = UserDoc::new("ada", "Ada").with_image("ada.png");
    ada.bio = Some("first programmer".to_string());
    let ada = store.insert_user(ada).await;
    let grace = store.insert_user(UserDoc::new("grace", "Grace")).await;
    let post = seed_thread(&store, "post", ada, 0).await;
    actions
        .add_comment_to_thread(&post.to_hex(), "reply", &grace.to_hex(), "/")
        .await
        .unwrap();

    let page = actions.fetch_posts(1, 20).await.unwrap();
    let post = &page.posts[0];

    let author = post.author.resolved().unwrap();
    assert_eq!(author.username.as_deref(), Some("ada"));
    assert_eq!(author.bio.as_deref(), Some("first programmer"));

    let reply = post.resolved_children().next().unwrap();
    let reply_author = reply.author.resolved().unwrap();
    assert_eq!(reply_author.name, "Grace");
    assert_eq!(reply_author.username, None);
}

#[tokio::test]
async fn test_fetch_posts_pagination() {
    let (store, _, actions) = setup();
    let author = store.insert_user(UserDoc::new("ada", "Ada")).await;
    for i in 0..5 {
        seed_thread(&store, &format!("post {}", i), author, i).await;
    }

    let first = actions.fetch_posts(1, 2).await.unwrap();
    assert_eq!(first.posts.len(), 2);
    assert_eq!(first.posts[0].text, "post 4");
    assert!(first.is_next);

    let third = actions.fetch_posts(3, 2).await.unwrap();
    assert_eq!(third.posts.len(), 1);
    assert_eq!(third.posts[0].text, "post 0");
    assert!(!third.is_next);

    let beyond = actions.fetch_posts(4, 2).await.unwrap();
    assert!(beyond.posts.is_empty());
    assert!(!beyond.is_next);
}

#[tokio::test]
async fn test_fetch_posts_errors_are_not_wrapped() {
    let (_, _, actions) = setup();

    let err = actions.fetch_posts(0, 20).await.unwrap_err();

    assert!(matches!(err, PersistError::InvalidPagination(_)));
    assert!(!err.to_string().starts_with("Error"));
}

#[tokio::test]
async fn test_fetch_thread_by_id_missing_and_malformed() {
    let (_, _, actions) = setup();

    let missing = actions.fetch_thread_by_id(&ObjectId::new().to_hex()).await.unwrap();
    assert!(missing.is_none());

    let err = actions.fetch_thread_by_id("12345").await.unwrap_err();
    assert!(err.to_string().starts_with("Error fetching thread by id: "));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_fetch_thread_by_id_resolves_two_levels() {
    let (store, _, actions) = setup();
    let ada = store.insert_user(UserDoc::new("ada", "Ada")).await;
    let grace = store.insert_user(UserDoc::new("grace", "Grace")).await;
    let alan = store.insert_user(UserDoc::new("alan", "Alan")).await;
    let root = seed_thread(&store, "root", ada, 0).await;

    actions.add_comment_to_thread(&root.to_hex(), "child", &grace.to_hex(), "/t").await.unwrap();
    let child = store.find_thread(root).await.unwrap().unwrap().children[0];
    actions.add_comment_to_thread(&child.to_hex(), "grandchild", &alan.to_hex(), "/t").await.unwrap();
    let grandchild = store.find_thread(child).await.unwrap().unwrap().children[0];
    actions.add_comment_to_thread(&grandchild.to_hex(), "great", &ada.to_hex(), "/t").await.unwrap();

    let view = actions.fetch_thread_by_id(&root.to_hex()).await.unwrap().unwrap();

    assert_eq!(view.author.resolved().unwrap().name, "Ada");
    let child_view = view.resolved_children().next().unwrap();
    assert_eq!(child_view.author.resolved().unwrap().name, "Grace");
    let grandchild_view = child_view.resolved_children().next().unwrap();
    assert_eq!(grandchild_view.author.resolved().unwrap().name, "Alan");
    assert_eq!(grandchild_view.children.len(), 1);
    assert!(matches!(grandchild_view.children[0], Reference::Id(_)));
}

#[tokio::test]
async fn test_add_comment_to_missing_thread() {
    let (store, revalidator, actions) = setup();
    let user = store.insert_user(UserDoc::new("ada", "Ada")).await;

    let err = actions
        .add_comment_to_thread(&ObjectId::new().to_hex(), "hi", &user.to_hex(), "/")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Thread not found"));
    assert!(err.to_string().starts_with("Error adding comment to thread: "));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.thread_count().await, 0);
    assert!(revalidator.paths().await.is_empty());
}

#[tokio::test]
async fn test_add_comment_appends_once() {
    let (store, revalidator, actions) = setup();
    let ada = store.insert_user(UserDoc::new("ada", "Ada")).await;
    let root = seed_thread(&store, "root", ada, 0).await;

    actions
        .add_comment_to_thread(&root.to_hex(), "reply", &ada.to_hex(), "/thread/1")
        .await
        .unwrap();

    let threads = store.all_threads().await;
    assert_eq!(threads.len(), 2);
    let comment = threads.iter().find(|t| t.id != root).unwrap();
    assert_eq!(comment.parent_id, Some(root));
    assert_eq!(comment.author, ada);
    assert_eq!(comment.text, "reply");

    let parent = store.find_thread(root).await.unwrap().unwrap();
    assert_eq!(parent.children, vec![comment.id]);
    assert_eq!(revalidator.paths().await, vec!["/thread/1".to_string()]);
}

#[tokio::test]
async fn test_add_comment_undoes_insert_when_parent_update_fails() {
    let inner = MemoryThreadStore::new();
    let ada = inner.insert_user(UserDoc::new("ada", "Ada")).await;
    let root = seed_thread(&inner, "root", ada, 0).await;
    let actions = ThreadActions::new(
        Arc::new(FailingPushStore { inner: inner.clone() }),
        Arc::new(RecordingRevalidator::default()),
    );

    let err = actions
        .add_comment_to_thread(&root.to_hex(), "reply", &ada.to_hex(), "/")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
    assert_eq!(inner.thread_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_comments_are_all_kept() {
    let (store, _, actions) = setup();
    let ada = store.insert_user(UserDoc::new("ada", "Ada")).await;
    let root = seed_thread(&store, "root", ada, 0).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let actions = actions.clone();
        let root = root.to_hex();
        let ada = ada.to_hex();
        handles.push(tokio::spawn(async move {
            actions
                .add_comment_to_thread(&root, &format!("reply {}", i), &ada, "/")
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let parent = store.find_thread(root).await.unwrap().unwrap();
    assert_eq!(parent.children.len(), 10);
}

#[tokio::test]
async fn test_create_fetch_comment_scenario() {
    let (store, _, actions) = setup();
    let u1 = store.insert_user(UserDoc::new("u1", "User One")).await;
    let u2 = store.insert_user(UserDoc::new("u2", "User Two").with_image("u2.png")).await;
    seed_thread(&store, "earlier", u1, -60).await;

    actions.create_thread(create_params("hello", u1, "/")).await.unwrap();

    let page = actions.fetch_posts(1, 20).await.unwrap();
    let t1 = page.posts[0].clone();
    assert_eq!(t1.text, "hello");

    actions
        .add_comment_to_thread(&t1.id, "C1", &u2.to_hex(), &format!("/thread/{}", t1.id))
        .await
        .unwrap();

    let view = actions.fetch_thread_by_id(&t1.id).await.unwrap().unwrap();
    let c1 = view.resolved_children().next().unwrap();
    assert_eq!(c1.text, "C1");
    let c1_author = c1.author.resolved().unwrap();
    assert_eq!(c1_author.id, u2.to_hex());
    assert_eq!(c1_author.name, "User Two");
    assert_eq!(c1_author.image.as_deref(), Some("u2.png"));
}
