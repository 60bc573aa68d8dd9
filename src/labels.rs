// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/labels.rs - 类别标签映射
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("读取标签文件失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("标签行无效: {0:?}, 期望 \"<编号> <名称>\"")]
  InvalidLine(String),
}

/// 类别编号到名称的映射，缺失的类别以编号本身显示
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
  names: HashMap<u32, String>,
}

impl LabelMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// 从 "<编号> <名称>" 每行一条的文本读取标签，空行忽略
  pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LabelError> {
    let mut names = HashMap::new();

    for line in reader.lines() {
      let line = line?;
      let line = line.trim();
      if line.is_empty() {
        continue;
      }

      let (id, name) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| LabelError::InvalidLine(line.to_string()))?;
      let id = id
        .parse()
        .map_err(|_| LabelError::InvalidLine(line.to_string()))?;
      names.insert(id, name.trim().to_string());
    }

    Ok(LabelMap { names })
  }

  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LabelError> {
    let file = std::fs::File::open(path)?;
    Self::from_reader(BufReader::new(file))
  }

  /// 按枚举顺序构造映射，编号从 0 开始
  pub fn from_names<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    LabelMap {
      names: names
        .into_iter()
        .enumerate()
        .map(|(id, name)| (id as u32, name.into()))
        .collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// 解析类别名称，未知类别退回十进制编号
  pub fn resolve(&self, class_id: u32) -> String {
    self
      .names
      .get(&class_id)
      .cloned()
      .unwrap_or_else(|| class_id.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn test_parse_label_file() {
    let text = "0  person\n1  bicycle\n\n15 bird\n";
    let labels = LabelMap::from_reader(Cursor::new(text)).unwrap();

    assert_eq!(labels.len(), 3);
    assert_eq!(labels.resolve(0), "person");
    assert_eq!(labels.resolve(15), "bird");
  }

  #[test]
  fn test_unknown_id_falls_back_to_number() {
    let labels = LabelMap::new();
    assert_eq!(labels.resolve(7), "7");
  }

  #[test]
  fn test_invalid_line_is_rejected() {
    assert!(matches!(
      LabelMap::from_reader(Cursor::new("person\n")),
      Err(LabelError::InvalidLine(_))
    ));
    assert!(matches!(
      LabelMap::from_reader(Cursor::new("x person\n")),
      Err(LabelError::InvalidLine(_))
    ));
  }

  #[test]
  fn test_from_names() {
    let labels = LabelMap::from_names(["cat", "dog"]);
    assert_eq!(labels.resolve(0), "cat");
    assert_eq!(labels.resolve(1), "dog");
    assert_eq!(labels.resolve(2), "2");
  }
}
