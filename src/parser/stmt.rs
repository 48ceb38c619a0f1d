use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{
            BlockStmt, EachStmt, EchoStmt, ExpressionStmt, FnDeclStmt, HaltStmt, IfStmt,
            RangeStmt, ReturnStmt, SkipStmt, TemplateDeclStmt, VarDeclStmt, WhileStmt,
        },
        types::{FunctionType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{
        expr::{parse_entity_literal, parse_expr},
        lookups::BindingPower,
    },
};

use super::{
    parser::Parser,
    types::{parse_parameters, parse_return_type, parse_type},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if parser.current_token_kind() == TokenKind::Identifier && is_declaration_start(parser) {
        return parse_var_decl_stmt(parser);
    }

    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    parse_expression_stmt(parser)
}

/// Whether an identifier at the cursor starts a declaration typed by a
/// template: `Name name`, `Name[] name`, `Name{str} name` and so on.
fn is_declaration_start(parser: &Parser) -> bool {
    let mut offset = 1;

    loop {
        match parser.peek_kind(offset) {
            TokenKind::Identifier => return true,
            TokenKind::OpenBracket if parser.peek_kind(offset + 1) == TokenKind::CloseBracket => {
                offset += 2;
            }
            TokenKind::OpenCurly => {
                // Braces must hold only a key type, otherwise this is an entity literal
                let mut depth = 0;
                loop {
                    match parser.peek_kind(offset) {
                        TokenKind::OpenCurly => depth += 1,
                        TokenKind::CloseCurly => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        TokenKind::Int
                        | TokenKind::Float
                        | TokenKind::Bool
                        | TokenKind::Str
                        | TokenKind::Identifier
                        | TokenKind::OpenBracket
                        | TokenKind::CloseBracket => {}
                        _ => return false,
                    }
                    offset += 1;
                }
                offset += 1;
            }
            _ => return false,
        }
    }
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    let expression = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Expression(ExpressionStmt {
        expression,
        position,
    }))
}

/// `Type name = initializer;`
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();

    let declared_type = parse_type(parser, BindingPower::Default)?;
    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::Assignment)?;
    let initializer = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::VarDecl(VarDeclStmt {
        id: parser.advance_id(),
        name,
        declared_type,
        initializer,
        position,
    }))
}

/// `entity name = Template{attr: value, ...};`
pub fn parse_entity_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Entity)?;

    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::Assignment)?;

    let error = Error::new(
        ErrorImpl::ExpectedToken {
            expected: String::from("template identifier"),
            received: parser.current_token().value.clone(),
        },
        parser.get_position(),
    );
    let template = parser
        .expect_error(TokenKind::Identifier, Some(error))?
        .value;
    let initializer = parse_entity_literal(parser, template.clone())?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::VarDecl(VarDeclStmt {
        id: parser.advance_id(),
        name,
        declared_type: Type::TypeName(template),
        initializer,
        position,
    }))
}

/// `{ statements }`
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::OpenCurly)?;

    let mut body = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt { body, position })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

fn parse_parenthesised_condition(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::If)?;

    let condition = parse_parenthesised_condition(parser)?;
    let then_block = parse_block(parser)?;

    let else_block = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_block(parser)?)
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_block,
        else_block,
        position,
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::While)?;

    let condition = parse_parenthesised_condition(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        position,
    }))
}

/// `range (i in start to end [by step]) { ... }`, step defaults to `1`.
pub fn parse_range_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Range)?;
    parser.expect(TokenKind::OpenParen)?;

    let variable = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::In)?;
    let start = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::To)?;
    let end = parse_expr(parser, BindingPower::Default)?;

    let step = if parser.current_token_kind() == TokenKind::By {
        parser.advance();
        parse_expr(parser, BindingPower::Default)?
    } else {
        Expr::int(1)
    };

    parser.expect(TokenKind::CloseParen)?;
    let body = parse_block(parser)?;

    Ok(Stmt::Range(RangeStmt {
        variable,
        start,
        end,
        step,
        body,
        position,
    }))
}

/// `each (x in iterable) { ... }`
pub fn parse_each_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Each)?;
    parser.expect(TokenKind::OpenParen)?;

    let variable = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::CloseParen)?;
    let body = parse_block(parser)?;

    Ok(Stmt::Each(EachStmt {
        variable,
        iterable,
        body,
        position,
    }))
}

pub fn parse_halt_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Halt)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Halt(HaltStmt { position }))
}

pub fn parse_skip_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Skip)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Skip(SkipStmt { position }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Return)?;

    let expression = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return(ReturnStmt {
        expression,
        position,
    }))
}

/// Statements led by `func`: a declaration `func name -> ...`, a variable
/// typed `func<...> name = ...;`, or a function literal expression.
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    match parser.peek_kind(1) {
        TokenKind::Less => parse_var_decl_stmt(parser),
        TokenKind::OpenBracket => parse_expression_stmt(parser),
        _ => Ok(Stmt::FnDecl(parse_fn_decl(parser)?)),
    }
}

/// `func name -> ReturnType = [ParamType name, ...] >> { body }`
pub fn parse_fn_decl(parser: &mut Parser) -> Result<FnDeclStmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Func)?;

    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::ReturnArrow)?;
    let return_type = parse_return_type(parser)?;
    parser.expect(TokenKind::Assignment)?;
    let params = parse_parameters(parser)?;
    parser.expect(TokenKind::Arrow)?;
    let body = parse_block(parser)?;

    Ok(FnDeclStmt {
        id: parser.advance_id(),
        name,
        function_type: FunctionType::new(return_type, params),
        body,
        position,
    })
}

pub fn parse_echo_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Echo)?;

    let expression = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Echo(EchoStmt {
        expression,
        position,
    }))
}

/// `template Name = { Type attr; func method -> ... };`
pub fn parse_template_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let position = parser.get_position();
    parser.expect(TokenKind::Template)?;

    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::Assignment)?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut attributes: Vec<(String, Type)> = vec![];
    let mut methods: Vec<FnDeclStmt> = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        let member_position = parser.get_position();

        let member = if parser.current_token_kind() == TokenKind::Func {
            let method = parse_fn_decl(parser)?;
            let member = method.name.clone();
            methods.push(method);
            member
        } else {
            let ty = parse_type(parser, BindingPower::Default)?;
            let member = parser.expect(TokenKind::Identifier)?.value;
            parser.expect(TokenKind::Semicolon)?;
            attributes.push((member.clone(), ty));
            member
        };

        let occurrences = attributes.iter().filter(|(a, _)| *a == member).count()
            + methods.iter().filter(|m| m.name == member).count();
        if occurrences > 1 {
            return Err(Error::new(
                ErrorImpl::DuplicateTemplateMember {
                    template: name,
                    member,
                },
                member_position,
            ));
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::TemplateDecl(TemplateDeclStmt {
        name,
        attributes,
        methods,
        position,
    }))
}
