//! Command handlers. Each prints JSON for data and a short line for actions.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use contacts_core::{Client, Credentials, RegistrationRequest, Shell, ShellState};
use serde_json::Value;

#[derive(Subcommand)]
pub enum ContactCommands {
    /// List contacts
    List {
        /// Only contacts whose name, email or phone match
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one contact
    Show { id: String },
    /// Create a contact from a JSON object
    Add {
        #[arg(long)]
        json: String,
    },
    /// Update a contact with the fields of a JSON object
    Edit {
        id: String,
        #[arg(long)]
        json: String,
    },
    /// Delete a contact
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum FavoriteCommands {
    /// List favorite contacts
    List,
    /// Mark a contact as favorite
    Add { id: String },
    /// Unmark a favorite contact
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List tags
    List,
    /// Create a tag from a JSON object
    Create {
        #[arg(long)]
        json: String,
    },
    /// Delete a tag
    Delete { id: String },
    /// List the contacts carrying a tag
    Contacts { id: String },
    /// Attach one or more contacts to a tag
    Attach {
        tag: String,
        #[arg(required = true)]
        contacts: Vec<String>,
    },
    /// Detach a contact from a tag
    Detach { tag: String, contact: String },
    /// List contacts that do not carry a tag yet
    Available { id: String },
}

pub fn login(shell: &mut Shell, email: String, password: String) -> Result<()> {
    let user = shell.login(&Credentials::new(email, password))?;
    println!("Signed in as {}", display_name(user.name(), user.email()));
    Ok(())
}

pub fn signup(shell: &mut Shell, name: String, email: String, password: String) -> Result<()> {
    shell.signup(&RegistrationRequest::new(name, email, password))?;
    if let ShellState::Unauthenticated {
        email_hint: Some(email),
        ..
    } = shell.state()
    {
        println!("Account created. Sign in with: contacts login --email {email} --password ...");
    }
    Ok(())
}

pub fn logout(shell: &mut Shell) -> Result<()> {
    if !shell.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    shell.logout()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(shell: &Shell) -> Result<()> {
    let user = shell.current_user().ok_or_else(not_signed_in)?;
    print_json(&user)
}

pub fn contacts(shell: &Shell, client: &Client, command: ContactCommands) -> Result<()> {
    ensure_signed_in(shell)?;
    let contacts = &client.contacts;
    match command {
        ContactCommands::List { search: Some(term) } => print_json(&contacts.search(&term)?),
        ContactCommands::List { search: None } => print_json(&contacts.list()?),
        ContactCommands::Show { id } => print_json(&contacts.get(&id)?),
        ContactCommands::Add { json } => print_json(&contacts.create(&parse_object(&json)?)?),
        ContactCommands::Edit { id, json } => {
            print_json(&contacts.update(&id, &parse_object(&json)?)?)
        }
        ContactCommands::Delete { id } => {
            contacts.delete(&id)?;
            println!("Deleted contact {id}");
            Ok(())
        }
    }
}

pub fn favorites(shell: &Shell, client: &Client, command: FavoriteCommands) -> Result<()> {
    ensure_signed_in(shell)?;
    let favorites = &client.favorites;
    match command {
        FavoriteCommands::List => print_json(&favorites.list()?),
        FavoriteCommands::Add { id } => print_json(&favorites.add(&id)?),
        FavoriteCommands::Remove { id } => print_json(&favorites.remove(&id)?),
    }
}

pub fn tags(shell: &Shell, client: &Client, command: TagCommands) -> Result<()> {
    ensure_signed_in(shell)?;
    let tags = &client.tags;
    match command {
        TagCommands::List => print_json(&tags.list()?),
        TagCommands::Create { json } => print_json(&tags.create(&parse_object(&json)?)?),
        TagCommands::Delete { id } => {
            tags.delete(&id)?;
            println!("Deleted tag {id}");
            Ok(())
        }
        TagCommands::Contacts { id } => print_json(&tags.contacts(&id)?),
        TagCommands::Attach { tag, contacts } => {
            let updated = match contacts.as_slice() {
                [single] => tags.add_contact(&tag, single)?,
                many => {
                    let ids: Vec<&str> = many.iter().map(String::as_str).collect();
                    tags.add_contacts(&tag, &ids)?
                }
            };
            print_json(&updated)
        }
        TagCommands::Detach { tag, contact } => print_json(&tags.remove_contact(&tag, &contact)?),
        TagCommands::Available { id } => print_json(&tags.available_contacts(&id)?),
    }
}

fn ensure_signed_in(shell: &Shell) -> Result<()> {
    shell.require_auth().map(|_| ()).map_err(|_| not_signed_in())
}

fn not_signed_in() -> anyhow::Error {
    anyhow!("not signed in; run `contacts login` first")
}

fn parse_object(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--json is not valid JSON")?;
    if !value.is_object() {
        return Err(anyhow!("--json must be a JSON object"));
    }
    Ok(value)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_name<'a>(name: Option<&'a str>, email: Option<&'a str>) -> &'a str {
    name.or(email).unwrap_or("unknown user")
}
