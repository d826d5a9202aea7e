//! CLI commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use inkpost_core::validation::{self, FieldErrors};
use inkpost_core::{
    ClientConfig, ContactDraft, ContentKind, FeedItem, FeedItemDraft, FileStore, Id, Post,
    PostDraft, SessionState, UserProfile, UserUpdate,
};
use inkpost_http::{ClientBuilder, PublicClient, SessionClient};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session
    Login {
        email: String,

        #[arg(long, env = "INKPOST_PASSWORD", hide_env_values = true)]
        password: String,

        /// Log in to the admin panel
        #[arg(long)]
        admin: bool,
    },

    /// Create an account
    Register {
        name: String,

        email: String,

        #[arg(long, env = "INKPOST_PASSWORD", hide_env_values = true)]
        password: String,

        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,

        /// Create an administrator account
        #[arg(long)]
        admin: bool,
    },

    /// Forget the saved session
    Logout,

    /// Show the signed-in user as the server sees it
    Whoami,

    /// Show the saved session without contacting the server
    Status,

    /// Show the home page: recent posts, news and trending items
    Home {
        #[arg(long)]
        search: Option<String>,
    },

    /// Blog posts
    Posts {
        #[command(subcommand)]
        command: ContentCommands,
    },

    /// News items
    News {
        #[command(subcommand)]
        command: ContentCommands,
    },

    /// Trending items
    Trending {
        #[command(subcommand)]
        command: ContentCommands,
    },

    /// Manage user accounts (admin)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage contact messages (admin)
    Messages {
        #[command(subcommand)]
        command: MessageCommands,
    },

    /// Send a message through the contact form
    Contact(ContactArgs),
}

#[derive(Subcommand)]
pub enum ContentCommands {
    /// List published items
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one item
    Get { id: String },

    /// List the items you wrote
    Mine,

    /// Publish a new item
    Create(DraftArgs),

    /// Replace one of your items
    Update {
        id: String,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete an item
    Delete { id: String },
}

/// Fields for posts (`excerpt`, `content`, `category`, `image`) and for
/// news or trending items (`summary`, `source`)
#[derive(Args)]
pub struct DraftArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    excerpt: Option<String>,

    #[arg(long)]
    content: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    image: Option<String>,

    #[arg(long)]
    summary: Option<String>,

    #[arg(long)]
    source: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    List,

    Get {
        id: String,
    },

    /// Change name and email, and the password when given
    Update {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: Option<String>,
    },

    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum MessageCommands {
    List,

    Get {
        id: String,
    },

    Update {
        id: String,

        #[command(flatten)]
        message: ContactArgs,
    },

    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    message: String,
}

impl ContactArgs {
    fn into_draft(self) -> ContactDraft {
        ContactDraft {
            name: self.name,
            email: self.email,
            message: self.message,
        }
    }
}

impl DraftArgs {
    fn into_post(self) -> PostDraft {
        PostDraft {
            title: self.title,
            excerpt: self.excerpt.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            image: self.image.filter(|i| !i.is_empty()),
        }
    }

    fn into_feed_item(self) -> FeedItemDraft {
        FeedItemDraft {
            title: self.title,
            summary: self.summary.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
        }
    }
}

fn public_client(config: &ClientConfig) -> Result<PublicClient> {
    Ok(ClientBuilder::from_config(&config.api).build_public()?)
}

fn session_client(config: &ClientConfig) -> Result<SessionClient> {
    let store = FileStore::in_dir(config.state_dir().data_dir());
    debug!(path = %store.path().display(), "Using saved session");
    Ok(ClientBuilder::from_config(&config.api).build_session(Arc::new(store))?)
}

/// Fail with every invalid field before anything is sent
fn ensure_valid(errors: &FieldErrors) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        bail!("{}", validation::summarize(errors))
    }
}

/// The signed-in author, from the saved profile when there is one
async fn author(client: &SessionClient) -> Result<Id> {
    let profile = match client.cached_user().await? {
        Some(profile) => profile,
        None => client.current_user().await?,
    };
    Ok(profile.id)
}

fn print_json(value: &Value) -> Result<()> {
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn print_user(user: &UserProfile) {
    println!(
        "{}\t{}\t{}\t{}",
        user.id,
        user.name.as_deref().unwrap_or("-"),
        user.email.as_deref().unwrap_or("-"),
        user.role
    );
}

fn print_posts(posts: &[Post]) {
    for post in posts {
        println!("{}\t{}\t{}", post.id, post.category, post.title);
    }
}

fn print_feed_items(items: &[FeedItem]) {
    for item in items {
        println!("{}\t{}\t{}", item.id, item.source, item.title);
    }
}

impl Commands {
    pub async fn execute(self, config: &ClientConfig) -> Result<()> {
        match self {
            Self::Login {
                email,
                password,
                admin,
            } => {
                ensure_valid(&validation::validate_login(&email, &password))?;
                let client = session_client(config)?;
                let user = if admin {
                    client.admin_login(&email, &password).await?
                } else {
                    client.login(&email, &password).await?
                };
                println!(
                    "Logged in as {} ({})",
                    user.name.as_deref().unwrap_or(&email),
                    user.role
                );
                Ok(())
            }
            Self::Register {
                name,
                email,
                password,
                confirm_password,
                admin,
            } => {
                let confirm = confirm_password.as_deref().unwrap_or(&password);
                ensure_valid(&validation::validate_registration(
                    &name, &email, &password, confirm,
                ))?;
                let client = public_client(config)?;
                if admin {
                    client.admin_register(&name, &email, &password).await?;
                } else {
                    client.register(&name, &email, &password).await?;
                }
                info!(%email, admin, "Account registered");
                println!("Account created. Run `inkpost login {email}` to sign in.");
                Ok(())
            }
            Self::Logout => {
                session_client(config)?.logout().await?;
                println!("Logged out");
                Ok(())
            }
            Self::Whoami => {
                let user = session_client(config)?.current_user().await?;
                print_user(&user);
                Ok(())
            }
            Self::Status => {
                let client = session_client(config)?;
                let state = client.state().await?;
                println!("Session: {state}");
                if state == SessionState::Authenticated {
                    if let Some(user) = client.cached_user().await? {
                        print_user(&user);
                    }
                }
                Ok(())
            }
            Self::Home { search } => {
                let feed = public_client(config)?.home(search.as_deref()).await?;
                println!("# Posts");
                print_posts(&feed.posts);
                println!("\n# News");
                print_feed_items(&feed.news);
                println!("\n# Trending");
                print_feed_items(&feed.trending);
                Ok(())
            }
            Self::Posts { command } => command.execute(config, ContentKind::Posts).await,
            Self::News { command } => command.execute(config, ContentKind::News).await,
            Self::Trending { command } => command.execute(config, ContentKind::Trending).await,
            Self::Users { command } => command.execute(config).await,
            Self::Messages { command } => command.execute(config).await,
            Self::Contact(args) => {
                let draft = args.into_draft();
                ensure_valid(&validation::validate_contact(&draft))?;
                let ack = public_client(config)?.send_contact(&draft).await?;
                println!("{ack}");
                Ok(())
            }
        }
    }
}

impl ContentCommands {
    pub async fn execute(self, config: &ClientConfig, kind: ContentKind) -> Result<()> {
        match self {
            Self::List { search } => {
                let client = public_client(config)?;
                let search = search.as_deref();
                match kind {
                    ContentKind::Posts => print_posts(&client.list_posts(search).await?),
                    _ => print_feed_items(&client.list_content(kind, search).await?),
                }
                Ok(())
            }
            Self::Get { id } => {
                let client = public_client(config)?;
                let id = Id::from(id.as_str());
                let item = match kind {
                    ContentKind::Posts => serde_json::to_value(client.get_post(&id).await?)?,
                    _ => serde_json::to_value(client.get_content::<FeedItem>(kind, &id).await?)?,
                };
                print_json(&item)
            }
            Self::Mine => {
                let client = session_client(config)?;
                let user_id = author(&client).await?;
                match kind {
                    ContentKind::Posts => print_posts(&client.my_posts(&user_id).await?),
                    _ => print_feed_items(&client.my_feed_items(kind, &user_id).await?),
                }
                Ok(())
            }
            Self::Create(draft) => {
                let client = session_client(config)?;
                let created = match kind {
                    ContentKind::Posts => {
                        let draft = draft.into_post();
                        ensure_valid(&validation::validate_post(&draft))?;
                        client.create_post(&author(&client).await?, &draft).await?
                    }
                    _ => {
                        let draft = draft.into_feed_item();
                        ensure_valid(&validation::validate_feed_item(&draft))?;
                        let user_id = author(&client).await?;
                        client.create_feed_item(kind, &user_id, &draft).await?
                    }
                };
                info!(%kind, "Item created");
                print_json(&created)
            }
            Self::Update { id, draft } => {
                let client = session_client(config)?;
                let id = Id::from(id.as_str());
                let updated = match kind {
                    ContentKind::Posts => {
                        let draft = draft.into_post();
                        ensure_valid(&validation::validate_post(&draft))?;
                        let user_id = author(&client).await?;
                        client.update_post(&id, &user_id, &draft).await?
                    }
                    _ => {
                        let draft = draft.into_feed_item();
                        ensure_valid(&validation::validate_feed_item(&draft))?;
                        let user_id = author(&client).await?;
                        client.update_feed_item(kind, &id, &user_id, &draft).await?
                    }
                };
                print_json(&updated)
            }
            Self::Delete { id } => {
                let id = Id::from(id.as_str());
                session_client(config)?.delete_content(kind, &id).await?;
                println!("Deleted {} {id}", kind.label());
                Ok(())
            }
        }
    }
}

impl UserCommands {
    pub async fn execute(self, config: &ClientConfig) -> Result<()> {
        let client = session_client(config)?;
        match self {
            Self::List => {
                for user in client.list_users().await? {
                    print_user(&user);
                }
            }
            Self::Get { id } => print_user(&client.get_user(&Id::from(id.as_str())).await?),
            Self::Update {
                id,
                name,
                email,
                password,
            } => {
                let update = UserUpdate {
                    name,
                    email,
                    password: password.filter(|p| !p.is_empty()),
                };
                ensure_valid(&validation::validate_user_update(&update))?;
                print_json(&client.update_user(&Id::from(id.as_str()), &update).await?)?;
            }
            Self::Delete { id } => {
                let id = Id::from(id.as_str());
                client.delete_user(&id).await?;
                println!("Deleted user {id}");
            }
        }
        Ok(())
    }
}

impl MessageCommands {
    pub async fn execute(self, config: &ClientConfig) -> Result<()> {
        let client = session_client(config)?;
        match self {
            Self::List => {
                for message in client.list_messages().await? {
                    println!(
                        "{}\t{}\t{}\t{}",
                        message.id,
                        message.created_at.as_deref().unwrap_or("-"),
                        message.email,
                        message.message.lines().next().unwrap_or_default()
                    );
                }
            }
            Self::Get { id } => {
                let message = client.get_message(&Id::from(id.as_str())).await?;
                print_json(&serde_json::to_value(message)?)?;
            }
            Self::Update { id, message } => {
                let draft = message.into_draft();
                ensure_valid(&validation::validate_contact(&draft))?;
                print_json(&client.update_message(&Id::from(id.as_str()), &draft).await?)?;
            }
            Self::Delete { id } => {
                let id = Id::from(id.as_str());
                client.delete_message(&id).await?;
                println!("Deleted message {id}");
            }
        }
        Ok(())
    }
}
