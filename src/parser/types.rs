//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive keywords (`int`, `float`, `bool`, `str`, `infer`, `null`)
//! - Template references (identifiers)
//! - Function types `func<ReturnType, [ParamType name, ...]>`
//! - Array `[]`, set `{}` and map `{KeyType}` suffixes, nesting freely
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing suffixed type expressions.

use std::collections::HashMap;

use crate::{
    ast::types::{FunctionType, Type},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser to initialize
pub fn create_token_type_lookups(parser: &mut Parser) {
    for kind in [
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Bool,
        TokenKind::Str,
        TokenKind::Infer,
        TokenKind::NullLiteral,
    ] {
        parser.type_nud(kind, parse_primitive_type);
    }
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Func, parse_function_type);

    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
    parser.type_led(TokenKind::OpenCurly, BindingPower::Call, parse_set_or_map_type);
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let ty = match parser.current_token_kind() {
        TokenKind::Int => Type::int(),
        TokenKind::Float => Type::float(),
        TokenKind::Bool => Type::bool(),
        TokenKind::Str => Type::str(),
        TokenKind::Infer => Type::infer(),
        TokenKind::NullLiteral => Type::null(),
        _ => return Err(parser.unexpected()),
    };
    parser.advance();

    Ok(ty)
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(Type::TypeName(token.value))
}

/// `func<ReturnType, [ParamType name, ...]>`
pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Func)?;
    parser.expect(TokenKind::Less)?;
    let return_type = parse_return_type(parser)?;
    parser.expect(TokenKind::Comma)?;
    let params = parse_parameters(parser)?;
    parser.expect(TokenKind::Greater)?;

    Ok(Type::Function(FunctionType::new(return_type, params)))
}

pub fn parse_array_type(parser: &mut Parser, left: Type, _bp: BindingPower) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Type::array(left))
}

/// `T{}` is a set of `T`, `T{K}` a map from `K` to `T`.
pub fn parse_set_or_map_type(
    parser: &mut Parser,
    left: Type,
    _bp: BindingPower,
) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    if parser.current_token_kind() == TokenKind::CloseCurly {
        parser.advance();
        return Ok(Type::set(left));
    }

    let key = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Type::map(key, left))
}

/// A variable type, or `void`.
pub fn parse_return_type(parser: &mut Parser) -> Result<Type, Error> {
    if parser.current_token_kind() == TokenKind::Void {
        parser.advance();
        return Ok(Type::void());
    }

    parse_type(parser, BindingPower::Default)
}

/// `[ParamType name, ...]`, shared by function declarations, function
/// literals and function types.
pub fn parse_parameters(parser: &mut Parser) -> Result<Vec<(String, Type)>, Error> {
    parser.expect(TokenKind::OpenBracket)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseBracket {
        loop {
            let ty = parse_type(parser, BindingPower::Default)?;
            let name = parser.expect(TokenKind::Identifier)?.value;
            params.push((name, ty));

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseBracket)?;

    Ok(params)
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While the next suffix binds tighter than the caller, keep wrapping lhs
    while *parser
        .get_type_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let (led, led_bp) = match (
            parser.get_type_led_lookup().get(&token_kind),
            parser.get_type_bp_lookup().get(&token_kind),
        ) {
            (Some(led), Some(led_bp)) => (*led, *led_bp),
            _ => return Err(parser.unexpected()),
        };

        left = led(parser, left, led_bp)?;
    }

    Ok(left)
}
