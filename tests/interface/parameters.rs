//! Integration tests for parameter parsing

use proptest::prelude::*;
use warden_interface::{
    ArgumentStream, CommandError, KeywordValue, KeywordsDescription, ParameterDescription,
    ParameterList, ParsedArguments, PresentationTypes, ReadItem, read_command, union,
};

fn parse(
    parameters: &ParameterList<()>,
    text: &str,
) -> (Result<ParsedArguments, CommandError>, bool) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut stream = ArgumentStream::new(read_command(text));
    let result = runtime.block_on(parameters.parse(&mut stream));
    (result, stream.is_exhausted())
}

fn strings(count: usize) -> ParameterList<()> {
    let types = PresentationTypes::standard();
    (0..count).fold(ParameterList::new(), |list, index| {
        list.parameter(ParameterDescription::new(
            format!("p{index}"),
            types.find("string").unwrap().clone(),
        ))
    })
}

proptest! {
    #[test]
    fn exact_arity_consumes_every_item(words in prop::collection::vec("[a-z]{1,8}", 0..8)) {
        let (result, exhausted) = parse(&strings(words.len()), &words.join(" "));
        let arguments = result.unwrap();
        prop_assert!(exhausted);
        prop_assert_eq!(arguments.immediate.len(), words.len());
        prop_assert!(arguments.rest.is_none());
        prop_assert!(arguments.keywords.is_empty());
    }

    #[test]
    fn one_item_too_many_is_unexpected(words in prop::collection::vec("[a-z]{1,8}", 1..8)) {
        let (result, _) = parse(&strings(words.len() - 1), &words.join(" "));
        let is_unexpected = matches!(result, Err(CommandError::UnexpectedArgument { .. }));
        prop_assert!(is_unexpected);
    }
}

#[test]
fn ban_command_binds_every_kind_of_argument() {
    let types = PresentationTypes::standard();
    let target = union(&[
        types.find("UserID").unwrap().clone(),
        types.find("MatrixRoomReference").unwrap().clone(),
    ]);
    let parameters = ParameterList::<()>::new()
        .parameter(ParameterDescription::new(
            "list",
            types.find("string").unwrap().clone(),
        ))
        .parameter(ParameterDescription::new("target", target))
        .rest(ParameterDescription::new(
            "reason",
            types.find("string").unwrap().clone(),
        ))
        .keywords(
            KeywordsDescription::new()
                .flag("no-confirm", "Skip confirmation")
                .property(
                    "expires",
                    types.find("integer").unwrap().clone(),
                    "Hours until the ban lapses",
                ),
        );

    let (result, exhausted) = parse(
        &parameters,
        "coc --expires 24 #room:example.org being rude --no-confirm",
    );
    let arguments = result.unwrap();
    assert!(exhausted);
    assert_eq!(arguments.immediate[0], ReadItem::String("coc".to_string()));
    assert!(matches!(arguments.immediate[1], ReadItem::Room(_)));
    assert_eq!(
        arguments.rest.unwrap(),
        read_command("being rude")
    );
    assert!(arguments.keywords.flag("no-confirm").unwrap());
    assert_eq!(
        arguments.keywords.get("expires").unwrap(),
        Some(&KeywordValue::Item(ReadItem::String("24".to_string())))
    );
}

#[test]
fn rejected_items_carry_their_position() {
    let types = PresentationTypes::standard();
    let parameters = ParameterList::<()>::new()
        .parameter(ParameterDescription::new(
            "list",
            types.find("string").unwrap().clone(),
        ))
        .parameter(ParameterDescription::new(
            "user",
            types.find("UserID").unwrap().clone(),
        ));
    let (result, _) = parse(&parameters, "coc #room:example.org");
    let Err(CommandError::ArgumentParse(error)) = result else {
        panic!("expected an argument parse error");
    };
    assert_eq!(error.parameter, "user");
    assert_eq!(error.position, 1);
    assert_eq!(error.preceding_items(), &read_command("coc")[..]);
    assert!(matches!(error.offending_item(), Some(ReadItem::Room(_))));
}

#[test]
fn plain_streams_do_not_prompt() {
    let types = PresentationTypes::standard();
    let parameters = ParameterList::<()>::new().parameter(
        ParameterDescription::new("list", types.find("string").unwrap().clone()).with_prompt(
            warden_interface::PromptOptions::new(vec![ReadItem::String("coc".to_string())]),
        ),
    );
    let (result, _) = parse(&parameters, "");
    let Err(CommandError::ArgumentParse(error)) = result else {
        panic!("expected an argument parse error");
    };
    assert_eq!(
        error.message,
        "An argument for the parameter list was expected but was not provided."
    );
}
