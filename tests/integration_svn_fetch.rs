//! Subversion取得の統合テスト

mod common;

use common::assertion_helpers::{assert_activity_contains, assert_activity_lacks};
use common::test_fixtures::{ApplicationFixture, IdentityFixture, ProxyFixture, SVN_URL};
use common::test_helpers::Sandbox;
use pretty_assertions::assert_eq;
use scm_provision::domain::entities::identity::IdentityRef;
use scm_provision::domain::entities::repository::RepositoryDescriptor;
use scm_provision::domain::value_objects::scm_type::ScmType;
use scm_provision::infrastructure::process::{Reply, ScriptedRunner};
use scm_provision::infrastructure::registry::InMemoryRegistry;
use scm_provision::infrastructure::scm::{Remote, ScmFactory};
use scm_provision::ProvisionError;
use std::path::{Path, PathBuf};

const CACHE_ENTRY: &str = "K 15\nsvn:realmstring\nV 37\n<https://svn.example.com:443> Example\nEND\n";

fn remote(repository: RepositoryDescriptor) -> Remote {
    Remote::new(repository).with_application(1)
}

fn svn_registry(repository: RepositoryDescriptor) -> InMemoryRegistry {
    InMemoryRegistry::new().with_application(ApplicationFixture::with_repository(1, repository))
}

fn auth_cache_dir(home: &Path) -> PathBuf {
    home.join(".subversion").join("auth").join("svn.simple")
}

/// Runner whose `svn info` leaves one cache entry behind, like the real client
fn caching_runner(home: &Path) -> ScriptedRunner {
    let dir = auth_cache_dir(home);
    ScriptedRunner::new().with_handler("svn", Some("info"), move |_| {
        std::fs::create_dir_all(&dir).expect("Failed to create auth cache");
        std::fs::write(dir.join("5d1c0a6f"), CACHE_ENTRY).expect("Failed to write auth cache");
        Reply::ok()
    })
}

#[tokio::test]
async fn test_checkout_url_defaults_to_trunk() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);
    let ctx = sandbox.context(&svn_registry(repository.clone()));
    let dest = sandbox.dest();

    let scm = assert_ok!(ScmFactory::create(ctx.clone(), &dest, remote(repository)).await);
    assert_eq!(scm.scm_type(), ScmType::Svn);
    assert_ok!(scm.fetch().await);

    assert_eq!(
        sandbox.runner.calls_to("svn")[0].display(),
        format!(
            "/usr/bin/svn --non-interactive checkout {}/trunk {}",
            SVN_URL,
            dest.display()
        )
    );
    assert_activity_contains(
        &ctx.activity().lines(),
        &format!("[SVN] Cloning: {}/trunk", SVN_URL),
    );
}

#[tokio::test]
async fn test_branch_is_a_path_segment() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("svn", SVN_URL).with_branch("release-1");
    let ctx = sandbox.context(&svn_registry(repository.clone()));

    let scm = assert_ok!(ScmFactory::create(ctx, sandbox.dest(), remote(repository)).await);
    assert_ok!(scm.fetch().await);

    let checkout = &sandbox.runner.calls_to("svn")[0];
    assert!(checkout
        .options
        .contains("https://svn.example.com/repo/release-1"));
}

#[tokio::test]
async fn test_servers_file_without_proxy_is_empty() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);
    let ctx = sandbox.context(&svn_registry(repository.clone()));

    let scm = assert_ok!(ScmFactory::create(ctx, sandbox.dest(), remote(repository)).await);
    assert_ok!(scm.fetch().await);

    assert_file_content!(&sandbox.home().join(".subversion").join("servers"), "");
}

#[tokio::test]
async fn test_servers_file_holds_proxy() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);
    let registry = svn_registry(repository.clone())
        .with_identity(IdentityFixture::proxy(8, "pu", "pp"))
        .with_proxy(
            ProxyFixture::https(3)
                .with_identity(IdentityRef::new(8))
                .with_excluded(vec!["localhost".to_string(), "*.internal".to_string()]),
        );
    let ctx = sandbox.context(&registry);

    let scm = assert_ok!(ScmFactory::create(ctx.clone(), sandbox.dest(), remote(repository)).await);
    assert_ok!(scm.fetch().await);

    assert_file_content!(
        &sandbox.home().join(".subversion").join("servers"),
        "[global]\n\
         http-proxy-host = proxy.corp\n\
         http-proxy-port = 3128\n\
         http-proxy-username = pu\n\
         http-proxy-password = pp\n\
         http-proxy-exceptions = localhost *.internal\n"
    );
    assert_activity_contains(&ctx.activity().lines(), "[SVN] Using proxy (3) https.");
}

#[tokio::test]
async fn test_password_is_injected_into_auth_cache() {
    let sandbox = Sandbox::new();
    let runner = caching_runner(&sandbox.home());
    let sandbox = sandbox.with_runner(runner);
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);
    let registry = InMemoryRegistry::new()
        .with_identity(IdentityFixture::basic(5, "alice", "p4ss"))
        .with_application(ApplicationFixture::attach(
            ApplicationFixture::with_repository(1, repository.clone()),
            &[5],
        ));
    let ctx = sandbox.context(&registry);

    let scm = assert_ok!(ScmFactory::create(ctx.clone(), sandbox.dest(), remote(repository)).await);
    assert_ok!(scm.fetch().await);

    let entry = auth_cache_dir(&sandbox.home()).join("5d1c0a6f");
    assert_file_content!(
        &entry,
        format!(
            "K 8\npasstype\nV 6\nsimple\nK 8\nusername\nV 5\nalice\nK 8\npassword\nV 4\np4ss\n{}",
            CACHE_ENTRY
        )
        .as_str()
    );

    // infoはSilentで実行され、パスワードはログに残らない
    let svn = sandbox.runner.calls_to("svn");
    assert_eq!(svn.len(), 2);
    assert!(svn[0].options.contains("info"));
    assert!(svn[0].options.contains("--password"));
    let activity = ctx.activity().lines();
    assert_activity_lacks(&activity, "p4ss");
    assert_activity_contains(&activity, &format!("[FILE] Updated {}.", entry.display()));
}

#[tokio::test]
async fn test_missing_auth_cache_is_wrapped_error() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);
    let registry = InMemoryRegistry::new()
        .with_identity(IdentityFixture::basic(5, "alice", "p4ss"))
        .with_application(ApplicationFixture::attach(
            ApplicationFixture::with_repository(1, repository.clone()),
            &[5],
        ));
    // 空のキャッシュディレクトリ
    std::fs::create_dir_all(auth_cache_dir(&sandbox.home())).unwrap();

    let scm = assert_ok!(
        ScmFactory::create(sandbox.context(&registry), sandbox.dest(), remote(repository)).await
    );
    let error = scm.fetch().await.unwrap_err();

    assert!(matches!(error, ProvisionError::FileSystem { .. }));
    assert!(!error.is_soft());
    assert_eq!(
        error.context(),
        vec![("path", auth_cache_dir(&sandbox.home()).display().to_string())]
    );
    // checkoutまで進まない
    assert_eq!(sandbox.runner.calls_to("svn").len(), 1);
}

#[tokio::test]
async fn test_insecure_mode_trusts_server_cert() {
    let sandbox = Sandbox::new();
    let url = "http://svn.example.com/repo";
    let repository = RepositoryDescriptor::new("subversion", url);
    let registry =
        svn_registry(repository.clone()).with_setting("svn.insecure.enabled", true);

    let scm = assert_ok!(
        ScmFactory::create(sandbox.context(&registry), sandbox.dest(), remote(repository)).await
    );
    assert!(scm.remote().insecure);
    assert_ok!(scm.fetch().await);

    let checkout = &sandbox.runner.calls_to("svn")[0];
    assert_eq!(
        checkout.options.as_slice()[..3].to_vec(),
        vec!["--non-interactive", "--trust-server-cert", "checkout"]
    );
}

#[tokio::test]
async fn test_plain_http_rejected_without_setting() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", "http://svn.example.com/repo");

    let error = ScmFactory::create(
        sandbox.context(&svn_registry(repository.clone())),
        sandbox.dest(),
        remote(repository),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(
        error.to_string(),
        "http URL used with svn.insecure.enabled = FALSE"
    );
}

#[tokio::test]
async fn test_branch_and_commit_are_unsupported() {
    let sandbox = Sandbox::new();
    let repository = RepositoryDescriptor::new("subversion", SVN_URL);

    let mut scm = assert_ok!(
        ScmFactory::create(
            sandbox.context(&svn_registry(repository.clone())),
            sandbox.dest(),
            remote(repository)
        )
        .await
    );

    let error = scm.branch("feature").await.unwrap_err();
    assert!(matches!(error, ProvisionError::UnsupportedOperation { .. }));
    assert!(error.is_soft());

    let error = scm.commit(&[], "message").await.unwrap_err();
    assert!(matches!(error, ProvisionError::UnsupportedOperation { .. }));
    assert!(sandbox.runner.calls().is_empty());
}
