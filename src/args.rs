// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;

/// Qiuhao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片路径
  /// 支持格式: *.jpg, *.jpeg, *.png, *.bmp
  #[arg(long, value_name = "FILE")]
  pub input: String,

  /// 模板目录，每个模板图片对应一个类别，
  /// 文件名（去扩展名）即类别名称
  #[arg(long, value_name = "DIR")]
  pub templates: String,

  /// 标签文件路径，"<编号> <名称>" 每行一条，覆盖模板名称
  #[arg(long, value_name = "FILE")]
  pub label: Option<String>,

  /// 瓦片尺寸列表，如 "1352x900,700x700,500x500,250x250"
  #[arg(long, value_name = "SIZES")]
  pub tile_sizes: String,

  /// 相邻瓦片的重叠（像素）
  #[arg(long, default_value = "15", value_name = "PIXELS")]
  pub tile_overlap: u32,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.1", value_name = "THRESHOLD")]
  pub score_threshold: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.1", value_name = "THRESHOLD")]
  pub iou_threshold: f32,

  /// 标注图输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<String>,

  /// 检测记录输出路径（.json 或文本）
  #[arg(long, value_name = "RECORD")]
  pub record: Option<String>,
}
