//! Wiring of adapters, repositories and services for one invocation.

use std::sync::Arc;

use gather_application::{
    ActivityRepository, CancellationToken, CollaborationRepository, EventsRepository,
    FriendsRepository, GraphQlRepository, GraphQlTransport, OperationExecutor, RetryPolicy,
    SessionToken, SessionTokenStore, UserRepository,
};
use gather_domain::ClientSettings;
use gather_infrastructure::{ClientBuildError, ReqwestGraphQlClient, ReqwestImageUploader};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "GATHER_TOKEN";

/// Everything a command needs, bound to one cancellation token.
pub struct Context {
    pub settings: ClientSettings,
    pub cancellation: CancellationToken,
    pub executor: OperationExecutor,
    pub friends: Arc<FriendsRepository>,
    pub events: Arc<EventsRepository>,
    pub collaboration: Arc<CollaborationRepository>,
    pub activity: Arc<ActivityRepository>,
    pub users: Arc<UserRepository>,
    pub uploader: Arc<ReqwestImageUploader>,
}

impl Context {
    pub async fn new(settings: ClientSettings) -> Result<Self, ClientBuildError> {
        let tokens = SessionTokenStore::new();
        if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            tokens.store(SessionToken::new(token)).await;
        } else {
            tracing::debug!("no access token, requests are anonymous");
        }
        let tokens = Arc::new(tokens);

        let cancellation = CancellationToken::new();
        let executor = OperationExecutor::new(RetryPolicy::from(settings.retry))
            .with_cancellation(cancellation.receiver());

        let transport: Arc<dyn GraphQlTransport> =
            Arc::new(ReqwestGraphQlClient::new(&settings, tokens.clone())?);
        let graphql = GraphQlRepository::new(transport, executor.clone());
        let uploader = Arc::new(ReqwestImageUploader::new(&settings, tokens)?);

        Ok(Self {
            friends: Arc::new(FriendsRepository::new(graphql.clone())),
            events: Arc::new(EventsRepository::new(graphql.clone())),
            collaboration: Arc::new(CollaborationRepository::new(graphql.clone())),
            activity: Arc::new(ActivityRepository::new(graphql.clone())),
            users: Arc::new(UserRepository::new(graphql)),
            uploader,
            settings,
            cancellation,
            executor,
        })
    }

    /// Cancels in-flight work when Ctrl-C is pressed.
    pub fn cancel_on_interrupt(&self) {
        let cancellation = self.cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, cancelling");
                cancellation.cancel();
            }
        });
    }
}
