//! Opcode definitions for the spending-script instruction set.
//!
//! Every named instruction byte is a variant of [`Opcode`]. The direct push
//! range `0x01..=0x4b` has no variant: those bytes are length prefixes and
//! are recognized by [`is_direct_push`].

use crate::error::DecodeError;

/// Largest payload a single direct-push byte can describe.
pub const MAX_DIRECT_PUSH: u8 = 0x4b;

/// Returns true for `0x01..=0x4b`, the bytes that push that many following bytes.
pub fn is_direct_push(byte: u8) -> bool {
    (0x01..=MAX_DIRECT_PUSH).contains(&byte)
}

/// Identifies one named instruction byte.
///
/// The `#[repr(u8)]` attribute gives each variant its wire value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Constants
    /// Push an empty byte string.
    False = 0x00,
    /// Push with a 1-byte length prefix.
    PushData1 = 0x4c,
    /// Push with a 2-byte little-endian length prefix.
    PushData2 = 0x4d,
    /// Push with a 4-byte little-endian length prefix.
    PushData4 = 0x4e,
    /// Push the number -1.
    OneNegate = 0x4f,
    Reserved = 0x50,
    True = 0x51,
    Two = 0x52,
    Three = 0x53,
    Four = 0x54,
    Five = 0x55,
    Six = 0x56,
    Seven = 0x57,
    Eight = 0x58,
    Nine = 0x59,
    Ten = 0x5a,
    Eleven = 0x5b,
    Twelve = 0x5c,
    Thirteen = 0x5d,
    Fourteen = 0x5e,
    Fifteen = 0x5f,
    Sixteen = 0x60,

    // Flow control
    Nop = 0x61,
    Ver = 0x62,
    If = 0x63,
    NotIf = 0x64,
    VerIf = 0x65,
    VerNotIf = 0x66,
    Else = 0x67,
    EndIf = 0x68,
    /// Pop a boolean, fail unless true.
    Verify = 0x69,
    /// Always fails.
    Return = 0x6a,

    // Stack
    ToAltStack = 0x6b,
    FromAltStack = 0x6c,
    TwoDrop = 0x6d,
    TwoDup = 0x6e,
    ThreeDup = 0x6f,
    TwoOver = 0x70,
    TwoRot = 0x71,
    TwoSwap = 0x72,
    IfDup = 0x73,
    Depth = 0x74,
    Drop = 0x75,
    Dup = 0x76,
    Nip = 0x77,
    Over = 0x78,
    Pick = 0x79,
    Roll = 0x7a,
    Rot = 0x7b,
    Swap = 0x7c,
    Tuck = 0x7d,

    // Splice
    Cat = 0x7e,
    Substr = 0x7f,
    Left = 0x80,
    Right = 0x81,
    Size = 0x82,

    // Bitwise logic
    Invert = 0x83,
    And = 0x84,
    Or = 0x85,
    Xor = 0x86,
    Equal = 0x87,
    EqualVerify = 0x88,
    Reserved1 = 0x89,
    Reserved2 = 0x8a,

    // Arithmetic
    OneAdd = 0x8b,
    OneSub = 0x8c,
    TwoMul = 0x8d,
    TwoDiv = 0x8e,
    Negate = 0x8f,
    Abs = 0x90,
    Not = 0x91,
    ZeroNotEqual = 0x92,
    Add = 0x93,
    Sub = 0x94,
    Mul = 0x95,
    Div = 0x96,
    Mod = 0x97,
    LShift = 0x98,
    RShift = 0x99,
    BoolAnd = 0x9a,
    BoolOr = 0x9b,
    NumEqual = 0x9c,
    NumEqualVerify = 0x9d,
    NumNotEqual = 0x9e,
    LessThan = 0x9f,
    GreaterThan = 0xa0,
    LessThanOrEqual = 0xa1,
    GreaterThanOrEqual = 0xa2,
    Min = 0xa3,
    Max = 0xa4,
    Within = 0xa5,

    // Crypto
    Ripemd160 = 0xa6,
    Sha1 = 0xa7,
    Sha256 = 0xa8,
    Hash160 = 0xa9,
    Hash256 = 0xaa,
    /// Marks the start of the subscript used for signature checks.
    CodeSeparator = 0xab,
    CheckSig = 0xac,
    CheckSigVerify = 0xad,
    CheckMultiSig = 0xae,
    CheckMultiSigVerify = 0xaf,

    // Expansion no-ops
    Nop1 = 0xb0,
    Nop2 = 0xb1,
    Nop3 = 0xb2,
    Nop4 = 0xb3,
    Nop5 = 0xb4,
    Nop6 = 0xb5,
    Nop7 = 0xb6,
    Nop8 = 0xb7,
    Nop9 = 0xb8,
    Nop10 = 0xb9,

    // Pseudo-words. Never valid in a script.
    PubKeyHash = 0xfd,
    PubKey = 0xfe,
    InvalidOpcode = 0xff,
}

/// All named opcodes, in byte order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 114] = [
    Opcode::False,
    Opcode::PushData1,
    Opcode::PushData2,
    Opcode::PushData4,
    Opcode::OneNegate,
    Opcode::Reserved,
    Opcode::True,
    Opcode::Two,
    Opcode::Three,
    Opcode::Four,
    Opcode::Five,
    Opcode::Six,
    Opcode::Seven,
    Opcode::Eight,
    Opcode::Nine,
    Opcode::Ten,
    Opcode::Eleven,
    Opcode::Twelve,
    Opcode::Thirteen,
    Opcode::Fourteen,
    Opcode::Fifteen,
    Opcode::Sixteen,
    Opcode::Nop,
    Opcode::Ver,
    Opcode::If,
    Opcode::NotIf,
    Opcode::VerIf,
    Opcode::VerNotIf,
    Opcode::Else,
    Opcode::EndIf,
    Opcode::Verify,
    Opcode::Return,
    Opcode::ToAltStack,
    Opcode::FromAltStack,
    Opcode::TwoDrop,
    Opcode::TwoDup,
    Opcode::ThreeDup,
    Opcode::TwoOver,
    Opcode::TwoRot,
    Opcode::TwoSwap,
    Opcode::IfDup,
    Opcode::Depth,
    Opcode::Drop,
    Opcode::Dup,
    Opcode::Nip,
    Opcode::Over,
    Opcode::Pick,
    Opcode::Roll,
    Opcode::Rot,
    Opcode::Swap,
    Opcode::Tuck,
    Opcode::Cat,
    Opcode::Substr,
    Opcode::Left,
    Opcode::Right,
    Opcode::Size,
    Opcode::Invert,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Equal,
    Opcode::EqualVerify,
    Opcode::Reserved1,
    Opcode::Reserved2,
    Opcode::OneAdd,
    Opcode::OneSub,
    Opcode::TwoMul,
    Opcode::TwoDiv,
    Opcode::Negate,
    Opcode::Abs,
    Opcode::Not,
    Opcode::ZeroNotEqual,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::LShift,
    Opcode::RShift,
    Opcode::BoolAnd,
    Opcode::BoolOr,
    Opcode::NumEqual,
    Opcode::NumEqualVerify,
    Opcode::NumNotEqual,
    Opcode::LessThan,
    Opcode::GreaterThan,
    Opcode::LessThanOrEqual,
    Opcode::GreaterThanOrEqual,
    Opcode::Min,
    Opcode::Max,
    Opcode::Within,
    Opcode::Ripemd160,
    Opcode::Sha1,
    Opcode::Sha256,
    Opcode::Hash160,
    Opcode::Hash256,
    Opcode::CodeSeparator,
    Opcode::CheckSig,
    Opcode::CheckSigVerify,
    Opcode::CheckMultiSig,
    Opcode::CheckMultiSigVerify,
    Opcode::Nop1,
    Opcode::Nop2,
    Opcode::Nop3,
    Opcode::Nop4,
    Opcode::Nop5,
    Opcode::Nop6,
    Opcode::Nop7,
    Opcode::Nop8,
    Opcode::Nop9,
    Opcode::Nop10,
    Opcode::PubKeyHash,
    Opcode::PubKey,
    Opcode::InvalidOpcode,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if is_direct_push(value) {
            return Err(DecodeError::DirectPush(value));
        }
        // ALL_OPCODES is sorted by byte value.
        ALL_OPCODES
            .binary_search_by_key(&value, |op| *op as u8)
            .map(|idx| ALL_OPCODES[idx])
            .map_err(|_| DecodeError::UndefinedOpcode(value))
    }
}

impl Opcode {
    /// The wire byte of this opcode.
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the canonical assembly mnemonic for this opcode.
    ///
    /// Small-integer opcodes render as their decimal value, so that the
    /// mnemonic of `0x55` is `"5"`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::False => "0",
            Opcode::PushData1 => "PUSHDATA1",
            Opcode::PushData2 => "PUSHDATA2",
            Opcode::PushData4 => "PUSHDATA4",
            Opcode::OneNegate => "-1",
            Opcode::Reserved => "RESERVED",
            Opcode::True => "1",
            Opcode::Two => "2",
            Opcode::Three => "3",
            Opcode::Four => "4",
            Opcode::Five => "5",
            Opcode::Six => "6",
            Opcode::Seven => "7",
            Opcode::Eight => "8",
            Opcode::Nine => "9",
            Opcode::Ten => "10",
            Opcode::Eleven => "11",
            Opcode::Twelve => "12",
            Opcode::Thirteen => "13",
            Opcode::Fourteen => "14",
            Opcode::Fifteen => "15",
            Opcode::Sixteen => "16",
            Opcode::Nop => "NOP",
            Opcode::Ver => "VER",
            Opcode::If => "IF",
            Opcode::NotIf => "NOTIF",
            Opcode::VerIf => "VERIF",
            Opcode::VerNotIf => "VERNOTIF",
            Opcode::Else => "ELSE",
            Opcode::EndIf => "ENDIF",
            Opcode::Verify => "VERIFY",
            Opcode::Return => "RETURN",
            Opcode::ToAltStack => "TOALTSTACK",
            Opcode::FromAltStack => "FROMALTSTACK",
            Opcode::TwoDrop => "2DROP",
            Opcode::TwoDup => "2DUP",
            Opcode::ThreeDup => "3DUP",
            Opcode::TwoOver => "2OVER",
            Opcode::TwoRot => "2ROT",
            Opcode::TwoSwap => "2SWAP",
            Opcode::IfDup => "IFDUP",
            Opcode::Depth => "DEPTH",
            Opcode::Drop => "DROP",
            Opcode::Dup => "DUP",
            Opcode::Nip => "NIP",
            Opcode::Over => "OVER",
            Opcode::Pick => "PICK",
            Opcode::Roll => "ROLL",
            Opcode::Rot => "ROT",
            Opcode::Swap => "SWAP",
            Opcode::Tuck => "TUCK",
            Opcode::Cat => "CAT",
            Opcode::Substr => "SUBSTR",
            Opcode::Left => "LEFT",
            Opcode::Right => "RIGHT",
            Opcode::Size => "SIZE",
            Opcode::Invert => "INVERT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Equal => "EQUAL",
            Opcode::EqualVerify => "EQUALVERIFY",
            Opcode::Reserved1 => "RESERVED1",
            Opcode::Reserved2 => "RESERVED2",
            Opcode::OneAdd => "1ADD",
            Opcode::OneSub => "1SUB",
            Opcode::TwoMul => "2MUL",
            Opcode::TwoDiv => "2DIV",
            Opcode::Negate => "NEGATE",
            Opcode::Abs => "ABS",
            Opcode::Not => "NOT",
            Opcode::ZeroNotEqual => "0NOTEQUAL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::LShift => "LSHIFT",
            Opcode::RShift => "RSHIFT",
            Opcode::BoolAnd => "BOOLAND",
            Opcode::BoolOr => "BOOLOR",
            Opcode::NumEqual => "NUMEQUAL",
            Opcode::NumEqualVerify => "NUMEQUALVERIFY",
            Opcode::NumNotEqual => "NUMNOTEQUAL",
            Opcode::LessThan => "LESSTHAN",
            Opcode::GreaterThan => "GREATERTHAN",
            Opcode::LessThanOrEqual => "LESSTHANOREQUAL",
            Opcode::GreaterThanOrEqual => "GREATERTHANOREQUAL",
            Opcode::Min => "MIN",
            Opcode::Max => "MAX",
            Opcode::Within => "WITHIN",
            Opcode::Ripemd160 => "RIPEMD160",
            Opcode::Sha1 => "SHA1",
            Opcode::Sha256 => "SHA256",
            Opcode::Hash160 => "HASH160",
            Opcode::Hash256 => "HASH256",
            Opcode::CodeSeparator => "CODESEPARATOR",
            Opcode::CheckSig => "CHECKSIG",
            Opcode::CheckSigVerify => "CHECKSIGVERIFY",
            Opcode::CheckMultiSig => "CHECKMULTISIG",
            Opcode::CheckMultiSigVerify => "CHECKMULTISIGVERIFY",
            Opcode::Nop1 => "NOP1",
            Opcode::Nop2 => "NOP2",
            Opcode::Nop3 => "NOP3",
            Opcode::Nop4 => "NOP4",
            Opcode::Nop5 => "NOP5",
            Opcode::Nop6 => "NOP6",
            Opcode::Nop7 => "NOP7",
            Opcode::Nop8 => "NOP8",
            Opcode::Nop9 => "NOP9",
            Opcode::Nop10 => "NOP10",
            Opcode::PubKeyHash => "PUBKEYHASH",
            Opcode::PubKey => "PUBKEY",
            Opcode::InvalidOpcode => "INVALIDOPCODE",
        }
    }

    /// Look up an opcode by its mnemonic.
    ///
    /// Matching is case-insensitive and accepts an optional `OP_` prefix.
    /// Word-style aliases (`TWODUP`, `ONEADD`, `ZERONOTEQUAL`, ...) resolve
    /// to the same opcode as their digit-prefixed mnemonic. Pseudo-words
    /// and constants never resolve; those are written as literals.
    pub fn from_mnemonic(word: &str) -> Option<Opcode> {
        let upper = word.to_ascii_uppercase();
        let name = upper.strip_prefix("OP_").unwrap_or(&upper);

        let aliased = match name {
            "TWODROP" => Some(Opcode::TwoDrop),
            "TWODUP" => Some(Opcode::TwoDup),
            "THREEDUP" => Some(Opcode::ThreeDup),
            "TWOOVER" => Some(Opcode::TwoOver),
            "TWOROT" => Some(Opcode::TwoRot),
            "TWOSWAP" => Some(Opcode::TwoSwap),
            "ONEADD" => Some(Opcode::OneAdd),
            "ONESUB" => Some(Opcode::OneSub),
            "TWOMUL" => Some(Opcode::TwoMul),
            "TWODIV" => Some(Opcode::TwoDiv),
            "ZERONOTEQUAL" => Some(Opcode::ZeroNotEqual),
            _ => None,
        };
        if aliased.is_some() {
            return aliased;
        }

        ALL_OPCODES
            .iter()
            .filter(|op| op.is_valid() && !op.is_constant())
            .find(|op| op.mnemonic() == name)
            .copied()
    }

    /// Push-data and small-integer opcodes (`0x00`, `0x4c..=0x4f`, `0x51..=0x60`).
    pub fn is_constant(self) -> bool {
        matches!(self as u8, 0x00 | 0x4c..=0x4f | 0x51..=0x60)
    }

    pub fn is_flow(self) -> bool {
        matches!(
            self,
            Opcode::Nop
                | Opcode::If
                | Opcode::NotIf
                | Opcode::Else
                | Opcode::EndIf
                | Opcode::Verify
                | Opcode::Return
        )
    }

    pub fn is_stack(self) -> bool {
        matches!(self as u8, 0x6b..=0x7d)
    }

    pub fn is_splice(self) -> bool {
        matches!(self as u8, 0x7e..=0x82)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self as u8, 0x83..=0x88)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self as u8, 0x8b..=0xa5)
    }

    pub fn is_crypto(self) -> bool {
        matches!(self as u8, 0xa6..=0xaf)
    }

    /// Opcodes that fail when executed but are legal to appear in a script.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Opcode::Reserved
                | Opcode::Ver
                | Opcode::VerIf
                | Opcode::VerNotIf
                | Opcode::Reserved1
                | Opcode::Reserved2
        )
    }

    pub fn is_nop(self) -> bool {
        self == Opcode::Nop || matches!(self as u8, 0xb0..=0xb9)
    }

    /// Legacy opcodes that always fail when executed.
    pub fn is_disabled(self) -> bool {
        matches!(
            self,
            Opcode::Cat
                | Opcode::Substr
                | Opcode::Left
                | Opcode::Right
                | Opcode::Size
                | Opcode::Invert
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::TwoMul
                | Opcode::TwoDiv
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::LShift
                | Opcode::RShift
        )
    }

    pub fn is_pseudo(self) -> bool {
        matches!(
            self,
            Opcode::PubKeyHash | Opcode::PubKey | Opcode::InvalidOpcode
        )
    }

    /// Whether this opcode may legally appear in a script.
    pub fn is_valid(self) -> bool {
        !self.is_pseudo()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
