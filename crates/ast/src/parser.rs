//! Tree builder: token stream → [`Program`].
//!
//! Works on any [`TokenSource`], so text and bytecode produce the same tree
//! for the same script.

use crate::error::ParseError;
use crate::node::{IfStmt, NodeId, NodeKind, Program};
use spendscript_common::{Token, TokenSource};

/// Which position field of a node waits for the next token's offset.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Pos(NodeId),
    End(NodeId),
}

struct TreeBuilder {
    program: Program,
    /// Block or code separator receiving new statements.
    current: NodeId,
    /// Open IF statements, innermost last.
    ifs: Vec<NodeId>,
    pending: Vec<Pending>,
}

impl TreeBuilder {
    fn new() -> Self {
        let program = Program::with_root(0);
        let current = program.root();
        Self {
            program,
            current,
            ifs: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Record `pos` as the start of the token just scanned.
    fn settle(&mut self, pos: usize) {
        for pending in self.pending.drain(..) {
            match pending {
                Pending::Pos(id) => {
                    let node = self.program.node_mut(id);
                    node.pos = pos;
                    node.end = pos;
                }
                Pending::End(id) => self.program.node_mut(id).end = pos,
            }
        }
    }

    fn append(&mut self, pos: usize, kind: NodeKind) -> NodeId {
        let id = self.program.alloc(self.current, pos, kind);
        if let NodeKind::Block(children) | NodeKind::CodeSeparator(children) =
            &mut self.program.node_mut(self.current).kind
        {
            children.push(id);
        }
        id
    }

    fn leaf(&mut self, pos: usize, kind: NodeKind) {
        let id = self.append(pos, kind);
        self.pending.push(Pending::End(id));
    }

    fn code_separator(&mut self, pos: usize) {
        let id = self.append(pos, NodeKind::CodeSeparator(Vec::new()));
        self.program.node_mut(id).end = pos;
        self.current = id;
    }

    fn open_if(&mut self, pos: usize, negated: bool) {
        let if_id = self.append(
            pos,
            NodeKind::If(IfStmt {
                negated,
                else_pos: None,
                endif_pos: pos,
                then_block: NodeId(usize::MAX),
                else_block: None,
            }),
        );
        let then_block = self.program.alloc(if_id, pos, NodeKind::Block(Vec::new()));
        if let NodeKind::If(stmt) = &mut self.program.node_mut(if_id).kind {
            stmt.then_block = then_block;
        }
        self.pending.push(Pending::Pos(then_block));
        self.ifs.push(if_id);
        self.current = then_block;
    }

    fn else_branch(&mut self, pos: usize) -> Result<(), ParseError> {
        let Some(&if_id) = self.ifs.last() else {
            return Err(ParseError::UnexpectedElse { at: pos });
        };
        let NodeKind::If(stmt) = &self.program.node(if_id).kind else {
            unreachable!("if stack holds only IF nodes");
        };
        if stmt.else_block.is_some() {
            return Err(ParseError::DuplicateElse { at: pos });
        }
        let then_block = stmt.then_block;
        self.close_scope(then_block, pos);

        let else_block = self.program.alloc(if_id, pos, NodeKind::Block(Vec::new()));
        if let NodeKind::If(stmt) = &mut self.program.node_mut(if_id).kind {
            stmt.else_pos = Some(pos);
            stmt.else_block = Some(else_block);
        }
        self.pending.push(Pending::Pos(else_block));
        self.current = else_block;
        Ok(())
    }

    fn end_if(&mut self, pos: usize) -> Result<(), ParseError> {
        let Some(if_id) = self.ifs.pop() else {
            return Err(ParseError::UnexpectedEndIf { at: pos });
        };
        let NodeKind::If(stmt) = &self.program.node(if_id).kind else {
            unreachable!("if stack holds only IF nodes");
        };
        let branch = stmt.else_block.unwrap_or(stmt.then_block);
        self.close_scope(branch, pos);

        if let NodeKind::If(stmt) = &mut self.program.node_mut(if_id).kind {
            stmt.endif_pos = pos;
        }
        self.pending.push(Pending::End(if_id));
        // An IF is always appended to a block or code separator.
        self.current = self.program.parent(if_id).unwrap_or(self.program.root());
        Ok(())
    }

    /// End the block `scope` and every code separator opened inside it at
    /// `pos`.
    fn close_scope(&mut self, scope: NodeId, pos: usize) {
        let mut id = self.current;
        loop {
            self.program.node_mut(id).end = pos;
            if id == scope {
                break;
            }
            match self.program.parent(id) {
                Some(parent) => id = parent,
                None => break,
            }
        }
    }
}

/// Build a program tree from `source`.
///
/// # Errors
///
/// - [`ParseError::InvalidToken`] on the first invalid token
/// - [`ParseError::UnexpectedElse`], [`ParseError::DuplicateElse`] and
///   [`ParseError::UnexpectedEndIf`] on unbalanced control flow
/// - [`ParseError::UnclosedIf`] if the input ends inside an IF
/// - [`ParseError::SourceErrors`] if the source counted lexical errors
pub fn parse<S: TokenSource + ?Sized>(source: &mut S) -> Result<Program, ParseError> {
    let mut b = TreeBuilder::new();

    loop {
        let token = source.scan();
        let pos = source.pos();
        b.settle(pos);

        match token {
            Token::EndOfScript => {
                if let Some(&if_id) = b.ifs.first() {
                    return Err(ParseError::UnclosedIf {
                        at: b.program.node(if_id).pos,
                    });
                }
                let root = b.program.root();
                b.close_scope(root, pos);
                break;
            }
            Token::Invalid => return Err(ParseError::InvalidToken { at: pos }),
            Token::Data => b.leaf(pos, NodeKind::Data(source.data().to_vec())),
            Token::Number => match source.number() {
                Some(n) => b.leaf(pos, NodeKind::Number(n.clone())),
                None => return Err(ParseError::InvalidToken { at: pos }),
            },
            Token::Operation => match source.op() {
                Some(op) => b.leaf(pos, NodeKind::Operation(op)),
                None => return Err(ParseError::InvalidToken { at: pos }),
            },
            Token::CodeSeparator => b.code_separator(pos),
            Token::If => b.open_if(pos, false),
            Token::NotIf => b.open_if(pos, true),
            Token::Else => b.else_branch(pos)?,
            Token::EndIf => b.end_if(pos)?,
        }
    }

    match source.error_count() {
        0 => Ok(b.program),
        count => Err(ParseError::SourceErrors { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Builder;
    use spendscript_common::{Opcode, Scanner};

    fn parse_bytes(script: &[u8]) -> Result<Program, ParseError> {
        parse(&mut Scanner::new(script))
    }

    #[test]
    fn empty_script() {
        let program = parse_bytes(&[]).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn flat_statements() {
        let program = parse_bytes(&[0x76, 0x02, 0xaa, 0xbb, 0x55]).unwrap();
        let expected = Builder::new()
            .op(Opcode::Dup)
            .data(vec![0xaa, 0xbb])
            .number(5)
            .finish();
        assert_eq!(program, expected);
    }

    #[test]
    fn leaf_extents_run_to_next_token() {
        let program = parse_bytes(&[0x76, 0x02, 0xaa, 0xbb, 0x55]).unwrap();
        let children = program.children(program.root()).to_vec();
        assert_eq!(program.extent(children[0]), 0..1);
        assert_eq!(program.extent(children[1]), 1..4);
        assert_eq!(program.extent(children[2]), 4..5);
        assert_eq!(program.extent(program.root()), 0..5);
    }

    #[test]
    fn if_else_positions() {
        // 1 IF 2 ELSE 3 ENDIF DUP
        let program = parse_bytes(&[0x51, 0x63, 0x52, 0x67, 0x53, 0x68, 0x76]).unwrap();
        let if_id = program.children(program.root())[1];
        let node = program.node(if_id);
        let NodeKind::If(stmt) = &node.kind else {
            panic!("expected IF");
        };
        assert!(!stmt.negated);
        assert_eq!(node.pos, 1);
        assert_eq!(stmt.else_pos, Some(3));
        assert_eq!(stmt.endif_pos, 5);
        assert_eq!(program.extent(if_id), 1..6);
        assert_eq!(program.extent(stmt.then_block), 2..3);
        assert_eq!(stmt.else_block.map(|e| program.extent(e)), Some(4..5));
        assert_eq!(program.parent(stmt.then_block), Some(if_id));
    }

    #[test]
    fn empty_branches() {
        let program = parse_bytes(&[0x63, 0x67, 0x68]).unwrap();
        let expected = Builder::new()
            .if_stmt(false, Builder::new(), Some(Builder::new()))
            .finish();
        assert_eq!(program, expected);
    }

    #[test]
    fn code_separator_reparents_rest_of_block() {
        // DUP IF CODESEPARATOR DROP ENDIF NOP
        let program = parse_bytes(&[0x76, 0x63, 0xab, 0x75, 0x68, 0x61]).unwrap();
        let expected = Builder::new()
            .op(Opcode::Dup)
            .if_stmt(
                false,
                Builder::new().code_separator().op(Opcode::Drop),
                None,
            )
            .op(Opcode::Nop)
            .finish();
        assert_eq!(program, expected);

        let if_id = program.children(program.root())[1];
        let NodeKind::If(stmt) = &program.node(if_id).kind else {
            panic!("expected IF");
        };
        let sep = program.children(stmt.then_block)[0];
        assert_eq!(program.extent(sep), 2..4);
    }

    #[test]
    fn unclosed_if() {
        assert_eq!(
            parse_bytes(&[0x76, 0x63, 0x64, 0x68]),
            Err(ParseError::UnclosedIf { at: 1 })
        );
    }

    #[test]
    fn stray_else_and_endif() {
        assert_eq!(
            parse_bytes(&[0x67]),
            Err(ParseError::UnexpectedElse { at: 0 })
        );
        assert_eq!(
            parse_bytes(&[0x76, 0x68]),
            Err(ParseError::UnexpectedEndIf { at: 1 })
        );
        assert_eq!(
            parse_bytes(&[0x63, 0x67, 0x67, 0x68]),
            Err(ParseError::DuplicateElse { at: 2 })
        );
    }

    #[test]
    fn invalid_token() {
        assert_eq!(
            parse_bytes(&[0x76, 0xff]),
            Err(ParseError::InvalidToken { at: 1 })
        );
    }

    #[test]
    fn source_errors_checked_at_end() {
        assert_eq!(
            parse_bytes(&[0x76, 0x4c]),
            Err(ParseError::SourceErrors { count: 1 })
        );
    }
}
