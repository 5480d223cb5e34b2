//! Integration tests for command tables and help

use std::sync::Arc;

use async_trait::async_trait;
use warden_document::{render_html, render_plain};
use warden_foundation::{ErrorKind, Registry};
use warden_interface::{
    ArgumentStream, CommandDefinition, CommandError, CommandExecutor, CommandOutcome,
    CommandTable, CommandTables, HelpExecutor, KeywordsDescription, ParameterDescription,
    ParameterList, ParsedArguments, PresentationTypes, read_command, render_command_synopsis,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Replies with the designator it was registered under.
struct Named(&'static str);

#[async_trait]
impl CommandExecutor<()> for Named {
    async fn execute(
        &self,
        _context: &(),
        _arguments: ParsedArguments,
    ) -> Result<CommandOutcome, CommandError> {
        let mut root = warden_document::InnerNode::root();
        root.paragraph().text(self.0);
        Ok(CommandOutcome::Reply(root))
    }
}

fn command(designator: &'static str) -> CommandDefinition<()> {
    CommandDefinition::<()>::new(designator.split(' '), Arc::new(Named(designator)))
        .with_summary(format!("Runs {designator}"))
}

fn ban() -> CommandDefinition<()> {
    let types = PresentationTypes::standard();
    command("ban").with_parameters(
        ParameterList::new()
            .parameter(
                ParameterDescription::new("list", types.find("string").unwrap().clone())
                    .with_description("The policy list"),
            )
            .parameter(ParameterDescription::new(
                "user",
                types.find("UserID").unwrap().clone(),
            ))
            .rest(ParameterDescription::new(
                "reason",
                types.find("string").unwrap().clone(),
            ))
            .keywords(KeywordsDescription::new().flag("no-confirm", "Skip confirmation")),
    )
}

fn moderation() -> CommandTable<()> {
    let mut table = CommandTable::new("moderation");
    table.intern_command(ban()).unwrap();
    table.intern_command(command("rooms")).unwrap();
    table.intern_command(command("rooms add")).unwrap();
    table.intern_command(command("rooms remove")).unwrap();
    table
}

fn designator_of(table: &CommandTable<()>, text: &str) -> Option<(String, usize)> {
    table
        .find_matching_command(&read_command(text))
        .map(|(command, depth)| (command.designator().join(" "), depth))
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn deepest_designator_wins() {
    let table = moderation();
    assert_eq!(
        designator_of(&table, "rooms add #a:example.org"),
        Some(("rooms add".to_string(), 2))
    );
    assert_eq!(
        designator_of(&table, "rooms list"),
        Some(("rooms".to_string(), 1))
    );
    assert_eq!(
        designator_of(&table, "ban coc @spam:example.org"),
        Some(("ban".to_string(), 1))
    );
    assert_eq!(designator_of(&table, "unban coc"), None);
    assert_eq!(designator_of(&table, ""), None);
}

#[test]
fn references_never_match_designator_words() {
    let table = moderation();
    assert_eq!(
        designator_of(&table, "rooms #add:example.org"),
        Some(("rooms".to_string(), 1))
    );
}

#[test]
fn imported_commands_are_reachable() {
    let mut root = CommandTable::new("warden");
    root.intern_command(command("help")).unwrap();
    root.intern_command(command("rooms list")).unwrap();
    root.import_table(Arc::new(moderation())).unwrap();

    assert_eq!(
        designator_of(&root, "rooms add #a:example.org"),
        Some(("rooms add".to_string(), 2))
    );
    assert_eq!(
        designator_of(&root, "rooms list"),
        Some(("rooms list".to_string(), 2))
    );
    assert_eq!(designator_of(&root, "help"), Some(("help".to_string(), 1)));
    assert_eq!(root.all_commands().len(), 6);
}

#[test]
fn designators_clash_across_imports() {
    let mut root = CommandTable::new("warden");
    root.intern_command(command("ban")).unwrap();
    let err = root.import_table(Arc::new(moderation())).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Duplicate {
            registry: Registry::CommandDesignator,
            ..
        }
    ));

    let mut root = CommandTable::new("warden");
    root.import_table(Arc::new(moderation())).unwrap();
    assert!(root.intern_command(command("rooms add")).is_err());
}

#[test]
fn tables_are_registered_by_name() {
    let mut tables = CommandTables::new();
    let defined = tables.define_table(moderation()).unwrap();
    assert!(Arc::ptr_eq(
        &defined,
        &tables.find_table("moderation").unwrap()
    ));
    assert!(tables.define_table(CommandTable::new("moderation")).is_err());
    assert!(tables.find_table("synapse").is_err());
}

// =============================================================================
// Invocation
// =============================================================================

#[tokio::test]
async fn found_commands_run_on_the_remaining_items() {
    let table = moderation();
    let items = read_command("ban coc @spam:example.org spamming links");
    let (ban, depth) = table.find_matching_command(&items).unwrap();
    let mut stream = ArgumentStream::new(items[depth..].to_vec());
    let outcome = ban.parse_then_invoke(&(), &mut stream).await.unwrap();
    let CommandOutcome::Reply(document) = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(render_plain(&document).unwrap(), "ban\n\n");
}

#[tokio::test]
async fn missing_arguments_stop_before_the_executor() {
    let table = moderation();
    let items = read_command("ban coc");
    let (ban, depth) = table.find_matching_command(&items).unwrap();
    let mut stream = ArgumentStream::new(items[depth..].to_vec());
    let err = ban.parse_then_invoke(&(), &mut stream).await.unwrap_err();
    let CommandError::ArgumentParse(error) = err else {
        panic!("expected an argument parse error");
    };
    assert_eq!(error.parameter, "user");
    assert!(error.offending_item().is_none());
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn synopsis_lists_every_parameter() {
    assert_eq!(
        render_command_synopsis(&ban()),
        "ban <list> <user> [...reason] [--no-confirm]"
    );
    assert_eq!(render_command_synopsis(&command("rooms add")), "rooms add");
}

#[tokio::test]
async fn help_describes_the_table_it_is_bound_to() {
    let help = Arc::new(HelpExecutor::<()>::new());
    let mut table = CommandTable::new("warden");
    table
        .intern_command(CommandDefinition::<()>::new(["help"], help.clone()))
        .unwrap();
    table.import_table(Arc::new(moderation())).unwrap();
    let table = Arc::new(table);
    assert!(help.bind(&table));
    assert!(!help.bind(&table));

    let CommandOutcome::Reply(document) = help
        .execute(&(), ParsedArguments::default())
        .await
        .unwrap()
    else {
        panic!("expected a reply");
    };
    let plain = render_plain(&document).unwrap();
    let html = render_html(&document).unwrap();
    assert!(plain.contains("Warden commands:"));
    assert!(plain.contains("Moderation commands:"));
    assert!(plain.contains("ban <list> <user> [...reason] [--no-confirm]"));
    assert!(plain.contains("The policy list"));
    assert!(html.contains("<details>"));
    assert!(html.contains("<code>rooms remove</code>"));
}

#[tokio::test]
async fn unbound_help_is_a_fault() {
    let help = HelpExecutor::<()>::new();
    let err = help
        .execute(&(), ParsedArguments::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::Fault(_)));
}
