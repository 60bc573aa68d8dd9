// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/tile.rs - 瓦片网格生成
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use crate::config::TileSize;

/// 瓦片窗口：全图像素坐标下的轴对齐矩形 [x0, y0) x [x1, y1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
  pub x0: u32,
  pub y0: u32,
  pub x1: u32,
  pub y1: u32,
}

impl TileWindow {
  pub fn width(&self) -> u32 {
    self.x1 - self.x0
  }

  pub fn height(&self) -> u32 {
    self.y1 - self.y0
  }

  /// 将瓦片内像素坐标的边界框平移到全图坐标，只平移不缩放
  pub fn remap(&self, bbox: [f32; 4]) -> [f32; 4] {
    let dx = self.x0 as f32;
    let dy = self.y0 as f32;
    [bbox[0] + dx, bbox[1] + dy, bbox[2] + dx, bbox[3] + dy]
  }
}

/// 瓦片网格迭代器
///
/// 窗口原点从 (0, 0) 开始按步长（瓦片尺寸减重叠）推进，行主序，
/// 原点严格小于图像尺寸即继续，因此最后一行/列的窗口可能只覆盖
/// 图像的剩余部分。窗口的远端被裁到图像边界，近端从不移动，
/// 即边缘瓦片会变小而不会回退原点。
#[derive(Debug, Clone)]
pub struct TileGrid {
  img_width: u32,
  img_height: u32,
  tile_width: u32,
  tile_height: u32,
  h_stride: u32,
  v_stride: u32,
  next_x: u32,
  next_y: u32,
}

impl TileGrid {
  /// 构造覆盖整幅图像的网格，要求重叠量小于瓦片的两个方向尺寸
  pub fn new(img_width: u32, img_height: u32, tile: TileSize, overlap: u32) -> Self {
    assert!(
      overlap < tile.width && overlap < tile.height,
      "重叠量必须小于瓦片尺寸: {} >= {}",
      overlap,
      tile,
    );

    TileGrid {
      img_width,
      img_height,
      tile_width: tile.width,
      tile_height: tile.height,
      h_stride: tile.width - overlap,
      v_stride: tile.height - overlap,
      next_x: 0,
      next_y: 0,
    }
  }

  /// 网格将产生的窗口总数
  pub fn window_count(&self) -> usize {
    let cols = self.img_width.div_ceil(self.h_stride) as usize;
    let rows = self.img_height.div_ceil(self.v_stride) as usize;
    cols * rows
  }
}

impl Iterator for TileGrid {
  type Item = TileWindow;

  fn next(&mut self) -> Option<Self::Item> {
    if self.next_y >= self.img_height {
      return None;
    }

    let window = TileWindow {
      x0: self.next_x,
      y0: self.next_y,
      x1: (self.next_x + self.tile_width).min(self.img_width),
      y1: (self.next_y + self.tile_height).min(self.img_height),
    };

    self.next_x += self.h_stride;
    if self.next_x >= self.img_width {
      self.next_x = 0;
      self.next_y += self.v_stride;
    }

    Some(window)
  }
}
