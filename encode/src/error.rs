use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    InvalidBaseCodeInDec(char),
    InvalidLenInDec(usize),
    /// 填充字符`=`出现在非结尾位置, 或者数量不对
    InvalidPaddingInDec(usize),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::InvalidLenInDec(len) => {
                f.write_fmt(format_args!("Invalid data length `{}` in the decode", len))
            }
            EncodeError::InvalidBaseCodeInDec(code) => f.write_fmt(format_args!(
                "Invalid base encode character `{}({:#x})`",
                code, *code as u64
            )),
            EncodeError::InvalidPaddingInDec(pos) => {
                f.write_fmt(format_args!("Invalid padding at the `{}`th character", pos))
            }
        }
    }
}

impl std::error::Error for EncodeError {}
