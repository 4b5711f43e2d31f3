//! Gather command-line client.

mod context;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use gather_application::{
    Accumulator, Cancelled, CollaborationRequestsModel, EventListKind, EventListModel,
    FriendsListModel, UnreadMessagesTracker, UploadImage, UserProfileModel,
};
use gather_domain::{DeepLink, DomainError, EntityRef, OperationError, UploadEntityType};
use gather_infrastructure::{ClientBuildError, ImageFileError, SettingsError, SettingsRepository, load_image};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use context::Context;
use output::{Format, finish, print_list, print_value};

#[derive(Parser)]
#[command(name = "gather")]
#[command(about = "Gather - events with friends", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List your friends
    Friends {
        /// Keep loading pages until the list is complete
        #[arg(short, long)]
        all: bool,
    },

    /// List incoming friend requests
    Requests,

    /// Accept a friend request
    Accept {
        /// Request ID
        request_id: String,
    },

    /// Reject a friend request
    Reject {
        /// Request ID
        request_id: String,
    },

    /// List one of your event lists
    Events {
        /// Which list
        #[arg(value_enum)]
        list: ListArg,

        /// Keep loading pages until the list is complete
        #[arg(short, long)]
        all: bool,
    },

    /// Remove an event from your saved list
    Unsave {
        /// Event ID
        event_id: String,
    },

    /// Show an event by numeric ID or slug
    Event {
        /// Event ID or slug
        target: String,
    },

    /// Show a user's profile and the events they attend
    Profile {
        /// Username
        username: String,

        /// Send them a friend request
        #[arg(long)]
        add_friend: bool,
    },

    /// Collaboration invitations for your events
    Collab {
        #[command(subcommand)]
        action: Option<CollabAction>,
    },

    /// Friends' recent activity
    Feed,

    /// Unread message count
    Unread,

    /// Upload an image
    Upload {
        /// Image file
        file: PathBuf,

        /// What the image belongs to (event, user, venue, group)
        #[arg(short = 't', long, default_value = "event")]
        entity_type: String,

        /// ID of the owning entity
        #[arg(short = 'i', long)]
        entity_id: Option<String>,
    },

    /// Resolve a universal or app link
    Deeplink {
        /// Link to resolve
        url: String,
    },

    /// Print the effective settings
    Settings {
        /// Write the effective settings back to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum CollabAction {
    /// Accept an invitation
    Accept { request_id: String },
    /// Decline an invitation
    Reject { request_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListArg {
    Saved,
    Attending,
    Subscribed,
}

impl From<ListArg> for EventListKind {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::Saved => Self::Saved,
            ListArg::Attending => Self::Attending,
            ListArg::Subscribed => Self::Subscribed,
        }
    }
}

/// Command failure.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Image(#[from] ImageFileError),

    #[error("output failed: {0}")]
    Output(String),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(match error {
            CliError::Cancelled(_) => 130,
            _ => 1,
        });
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = if cli.json { Format::Json } else { Format::Text };
    let repository = cli
        .settings
        .map_or_else(SettingsRepository::new, SettingsRepository::with_path);
    let settings = repository.load_with_env().await?;

    if let Commands::Settings { save } = cli.command {
        if save {
            repository.save(&settings).await?;
        }
        print!("{}", gather_infrastructure::to_json_stable(&settings)?);
        return Ok(());
    }
    if let Commands::Deeplink { url } = &cli.command {
        return deeplink(url, &settings.web_host);
    }

    let context = Context::new(settings).await?;
    context.cancel_on_interrupt();
    tracing::debug!(api = %context.settings.api_url, "client ready");
    let page_size = context.settings.page_size;

    match cli.command {
        Commands::Friends { all } => {
            let model = FriendsListModel::new(Arc::clone(&context.friends), page_size);
            model.load_friends().await?;
            while all && model.load_more().await? {}
            print_list(format, model.friends())
        }
        Commands::Requests => {
            let model = FriendsListModel::new(Arc::clone(&context.friends), page_size);
            model.load_requests().await?;
            print_list(format, model.requests())
        }
        Commands::Accept { request_id } => {
            let model = FriendsListModel::new(Arc::clone(&context.friends), page_size);
            let friend = finish(model.accept_friend_request(&request_id).await)?;
            print_value(format, &friend)
        }
        Commands::Reject { request_id } => {
            let model = FriendsListModel::new(Arc::clone(&context.friends), page_size);
            let id = finish(model.reject_friend_request(&request_id).await)?;
            println!("rejected {id}");
            Ok(())
        }
        Commands::Events { list, all } => {
            let model = EventListModel::new(Arc::clone(&context.events), list.into(), page_size);
            model.load().await?;
            while all && model.load_more().await? {}
            print_list(format, model.events())
        }
        Commands::Unsave { event_id } => {
            let model = EventListModel::new(Arc::clone(&context.events), EventListKind::Saved, page_size);
            let saved = finish(model.unsave_event(&event_id).await)?;
            println!("{event_id} saved: {saved}");
            Ok(())
        }
        Commands::Event { target } => {
            let detail = match EntityRef::parse(&target) {
                EntityRef::Id(id) => finish(context.events.event(&id.to_string()).await)?,
                EntityRef::Slug(slug) => finish(context.events.event_by_slug(&slug).await)?,
            };
            print_value(format, &detail)
        }
        Commands::Profile { username, add_friend } => {
            let model = UserProfileModel::new(
                username,
                Arc::clone(&context.users),
                &context.events,
                Arc::clone(&context.friends),
                page_size,
            );
            model.load().await?;
            let profile = finish(Ok(model.profile()))?;
            print_value(format, &profile)?;
            if add_friend {
                let id = finish(model.send_friend_request().await)?;
                println!("friend request {id} sent to @{}", model.username());
            }
            print_list(format, model.attending())
        }
        Commands::Collab { action } => {
            let model =
                CollaborationRequestsModel::new(Arc::clone(&context.collaboration), page_size);
            match action {
                None => {
                    model.load().await?;
                    print_list(format, model.requests())
                }
                Some(CollabAction::Accept { request_id }) => {
                    let status = finish(model.accept(&request_id).await)?;
                    println!("{request_id}: {status}");
                    Ok(())
                }
                Some(CollabAction::Reject { request_id }) => {
                    let status = finish(model.reject(&request_id).await)?;
                    println!("{request_id}: {status}");
                    Ok(())
                }
            }
        }
        Commands::Feed => {
            let feed = Accumulator::new("activity_feed", page_size, context.activity.feed_source());
            feed.load().await?;
            print_list(format, feed.snapshot())
        }
        Commands::Unread => {
            let tracker = UnreadMessagesTracker::new(Arc::clone(&context.users));
            finish(tracker.refresh().await)?;
            println!("{}", tracker.count());
            Ok(())
        }
        Commands::Upload {
            file,
            entity_type,
            entity_id,
        } => {
            let entity_type = UploadEntityType::from_name(&entity_type).ok_or_else(|| {
                DomainError::InvalidUpload(format!("unknown entity type '{entity_type}'"))
            })?;
            let mut upload = load_image(&file, entity_type).await?;
            if let Some(entity_id) = entity_id {
                upload = upload.with_entity_id(entity_id);
            }
            let use_case = UploadImage::new(Arc::clone(&context.uploader), context.executor.clone());
            let uploaded = finish(use_case.execute(&upload).await)?;
            println!("{}", uploaded.url);
            Ok(())
        }
        Commands::Deeplink { .. } | Commands::Settings { .. } => Ok(()),
    }
}

fn deeplink(url: &str, web_host: &str) -> Result<(), CliError> {
    let link = DeepLink::parse(url, web_host)?;
    tracing::debug!(?link, "link resolved");
    println!("{}", link.to_app_url());
    Ok(())
}
