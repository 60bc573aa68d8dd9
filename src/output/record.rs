// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/output/record.rs - 检测记录输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::{Context, Result};
use chrono::Utc;
use image::RgbImage;

use super::OutputWriter;
use crate::pipeline::Detection;

/// 检测记录输出：.json 扩展名写 JSON 文档，其余写逐行文本
pub struct RecordWriter {
  /// 输出路径
  output_path: String,
}

impl RecordWriter {
  pub fn new(output_path: &str) -> Self {
    Self {
      output_path: output_path.to_string(),
    }
  }
}

fn to_json(detections: &[Detection]) -> serde_json::Value {
  serde_json::json!({
    "generated_at": Utc::now().to_rfc3339(),
    "count": detections.len(),
    "detections": detections
      .iter()
      .map(|d| {
        serde_json::json!({
          "class_id": d.class_id,
          "label": d.label,
          "score": d.score,
          "bbox": d.bbox,
        })
      })
      .collect::<Vec<_>>(),
  })
}

fn to_text(detections: &[Detection]) -> String {
  let mut records = Vec::with_capacity(detections.len());
  for d in detections {
    records.push(format!(
      "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
      d.label, d.score, d.bbox[0], d.bbox[1], d.bbox[2], d.bbox[3]
    ));
  }
  records.join("\n")
}

impl OutputWriter for RecordWriter {
  fn write(&mut self, _image: &RgbImage, detections: &[Detection]) -> Result<()> {
    let content = if self.output_path.to_lowercase().ends_with(".json") {
      serde_json::to_string_pretty(&to_json(detections))?
    } else {
      to_text(detections)
    };

    std::fs::write(&self.output_path, content)
      .with_context(|| format!("无法写出检测记录: {}", self.output_path))?;

    Ok(())
  }

  fn finish(&mut self) -> Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detections() -> Vec<Detection> {
    vec![
      Detection {
        class_id: 0,
        label: "bird".to_string(),
        score: 0.9125,
        bbox: [10.0, 20.0, 30.0, 40.0],
      },
      Detection {
        class_id: 3,
        label: "3".to_string(),
        score: 0.5,
        bbox: [100.0, 100.0, 110.0, 110.0],
      },
    ]
  }

  #[test]
  fn test_text_record_format() {
    let text = to_text(&detections());
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "bird, 0.9125, 10.0000, 20.0000, 30.0000, 40.0000");
    assert_eq!(lines[1], "3, 0.5000, 100.0000, 100.0000, 110.0000, 110.0000");
  }

  #[test]
  fn test_json_record_shape() {
    let doc = to_json(&detections());

    assert_eq!(doc["count"], 2);
    assert!(doc["generated_at"].is_string());
    assert_eq!(doc["detections"][0]["label"], "bird");
    assert_eq!(doc["detections"][1]["class_id"], 3);
    assert_eq!(doc["detections"][0]["bbox"][2], 30.0);
  }
}
