use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayLiteral, AssignmentExpr, BinaryExpr, BinaryOp, EntityLiteral, Fixity,
            FunctionLiteral, IndexExpr, MapLiteral, MemberExpr, MethodCallExpr, Number,
            SetLiteral, UnaryExpr, UnaryOp,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::parse_block,
    types::parse_parameters,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while *parser
        .get_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let (led, led_bp) = match (
            parser.get_led_lookup().get(&token_kind),
            parser.get_bp_lookup().get(&token_kind),
        ) {
            (Some(led), Some(led_bp)) => (*led, *led_bp),
            _ => return Err(parser.unexpected()),
        };

        left = led(parser, left, led_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let expr = match token.kind {
        TokenKind::IntegerLiteral => match token.value.parse::<i64>() {
            Ok(value) => Expr::Numeric(Number::Int(value)),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::FloatLiteral => match token.value.parse::<f64>() {
            Ok(value) => Expr::Numeric(Number::Float(value)),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::StringLiteral => Expr::String(token.value),
        TokenKind::BooleanLiteral => Expr::Boolean(token.value == "true"),
        TokenKind::NullLiteral => Expr::Null,
        _ => return Err(parser.unexpected()),
    };
    parser.advance();

    Ok(expr)
}

/// A variable reference, or an entity literal when directly followed by `{`.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let name = parser.expect(TokenKind::Identifier)?.value;

    if parser.current_token_kind() == TokenKind::OpenCurly {
        return parse_entity_literal(parser, name);
    }

    Ok(Expr::Identifier(name))
}

/// `{attr: expr, ...}` after a template name. Commas between attributes are optional.
pub fn parse_entity_literal(parser: &mut Parser, template: String) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut attributes = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let attribute = parser.expect(TokenKind::Identifier)?.value;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Default)?;
        attributes.push((attribute, value));

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Entity(EntityLiteral {
        template,
        attributes,
    }))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    let operator = match kind {
        TokenKind::Plus | TokenKind::PlusEquals => BinaryOp::Add,
        TokenKind::Dash | TokenKind::MinusEquals => BinaryOp::Subtract,
        TokenKind::Star | TokenKind::StarEquals => BinaryOp::Multiply,
        TokenKind::Slash | TokenKind::SlashEquals => BinaryOp::Divide,
        TokenKind::Equals => BinaryOp::Equal,
        TokenKind::NotEquals => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::LessEquals => BinaryOp::LessEqual,
        TokenKind::GreaterEquals => BinaryOp::GreaterEqual,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    };
    Some(operator)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator = match binary_operator(parser.current_token_kind()) {
        Some(operator) => operator,
        None => return Err(parser.unexpected()),
    };
    parser.advance();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator = match parser.current_token_kind() {
        TokenKind::PlusPlus => UnaryOp::Increment,
        TokenKind::MinusMinus => UnaryOp::Decrement,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Dash => UnaryOp::Negate,
        _ => return Err(parser.unexpected()),
    };
    parser.advance();

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Unary(UnaryExpr {
        operator,
        operand: Box::new(operand),
        fixity: Fixity::Prefix,
    }))
}

pub fn parse_postfix_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let operator = match parser.current_token_kind() {
        TokenKind::PlusPlus => UnaryOp::Increment,
        TokenKind::MinusMinus => UnaryOp::Decrement,
        _ => return Err(parser.unexpected()),
    };
    parser.advance();

    Ok(Expr::Unary(UnaryExpr {
        operator,
        operand: Box::new(left),
        fixity: Fixity::Postfix,
    }))
}

/// `target = value`, plus the compound forms which desugar to
/// `target = target op value`.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    if !left.is_assignment_target() {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            operator_token.span.start,
        ));
    }

    // Right associative: parse the rhs one level below assignment
    let rhs = parse_expr(parser, BindingPower::Comma)?;

    let value = match operator_token.kind {
        TokenKind::Assignment => rhs,
        kind => match binary_operator(kind) {
            Some(operator) => Expr::Binary(BinaryExpr {
                left: Box::new(left.clone()),
                operator,
                right: Box::new(rhs),
            }),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: operator_token.value,
                    },
                    operator_token.span.start,
                ))
            }
        },
    };

    Ok(Expr::Assignment(AssignmentExpr {
        target: Box::new(left),
        value: Box::new(value),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Comma separated expressions up to (not including) `close`.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut items = vec![];

    if parser.current_token_kind() != close {
        loop {
            items.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    Ok(items)
}

fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let args = parse_expr_list(parser, TokenKind::CloseParen)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(args)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let arguments = parse_arguments(parser)?;

    Ok(Expr::call(left, arguments))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::Index(IndexExpr {
        base: Box::new(left),
        index: Box::new(index),
    }))
}

/// `.name`, or `.name(args)` which becomes a method call.
pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::Dot)?;
    let member = parser.expect(TokenKind::Identifier)?.value;

    if parser.current_token_kind() == TokenKind::OpenParen {
        let arguments = parse_arguments(parser)?;
        return Ok(Expr::MethodCall(MethodCallExpr {
            object: Box::new(left),
            method: member,
            arguments,
        }));
    }

    Ok(Expr::Member(MemberExpr {
        object: Box::new(left),
        member,
    }))
}

/// An array literal, or the argument list of a pipe when followed by `>>`.
///
/// `[a, b] >> f(x) >> g` becomes `g(f(a, b, x))`: the first stage receives the
/// bracketed elements, every later stage the previous call, each followed by
/// its own parenthesised arguments.
pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    if parser.current_token_kind() != TokenKind::Arrow {
        return Ok(Expr::Array(ArrayLiteral { elements }));
    }

    let mut arguments = elements;
    let mut call = None;

    while parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        let callee = parser.expect(TokenKind::Identifier)?.value;

        let mut args = match call.take() {
            Some(previous) => vec![previous],
            None => std::mem::take(&mut arguments),
        };
        if parser.current_token_kind() == TokenKind::OpenParen {
            args.extend(parse_arguments(parser)?);
        }

        call = Some(Expr::call(Expr::Identifier(callee), args));
    }

    match call {
        Some(call) => Ok(call),
        None => Err(parser.unexpected()),
    }
}

/// `{a, b}` is a set; a colon after the first element makes it a map.
pub fn parse_set_or_map_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    if parser.current_token_kind() == TokenKind::CloseCurly {
        parser.advance();
        return Ok(Expr::Set(SetLiteral { elements: vec![] }));
    }

    let first = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        let mut pairs = vec![(first, value)];

        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            let key = parse_expr(parser, BindingPower::Default)?;
            parser.expect(TokenKind::Colon)?;
            let value = parse_expr(parser, BindingPower::Default)?;
            pairs.push((key, value));
        }

        parser.expect(TokenKind::CloseCurly)?;
        return Ok(Expr::Map(MapLiteral { pairs }));
    }

    let mut elements = vec![first];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        elements.push(parse_expr(parser, BindingPower::Default)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Set(SetLiteral { elements }))
}

/// `func [T a, ...] >> { body }`
pub fn parse_function_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::Func)?;
    let params = parse_parameters(parser)?;
    parser.expect(TokenKind::Arrow)?;
    let body = parse_block(parser)?;

    Ok(Expr::Function(FunctionLiteral { params, body }))
}
