//! Vendor fixture directories built from inline XML.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const CQ3K_DETAIL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<bts:MeasurementDetail xmlns:bts="http://www.yokogawa.co.jp/BTS/BTSSchema/1.0" bts:Version="1.0" bts:OperatorName="op" bts:Title="2w1p1c1z1t" bts:Application="CellVoyager" bts:BeginTime="2024-01-01T00:00:00" bts:EndTime="2024-01-01T00:10:00" bts:MeasurementSettingFileName="settings.mes" bts:ColumnCount="12" bts:RowCount="8" bts:TimePointCount="1" bts:FieldCount="1" bts:ZCount="1" bts:TargetSystem="CQ3000">
  <bts:MeasurementSamplePlate bts:Name="96-well" bts:WellPlateFileName="96.wpi" bts:WellPlateProductFileName="96.wpp"/>
  <bts:MeasurementChannel bts:Ch="1" bts:HorizontalPixelDimension="0.65" bts:VerticalPixelDimension="0.65" bts:CameraNumber="1" bts:InputBitDepth="16" bts:InputLevel="4095" bts:HorizontalPixels="2000" bts:VerticalPixels="1600" bts:FilterWheelPosition="1" bts:FilterPosition="1" bts:ShadingCorrectionSource="none"/>
</bts:MeasurementDetail>"#;

/// One CQ3K image record
pub struct Cq3kRecord<'a> {
    pub row: u32,
    pub column: u32,
    pub field: u32,
    pub time_point: u32,
    pub z_index: u32,
    pub ch: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub z_image_processing: Option<&'a str>,
}

impl Default for Cq3kRecord<'_> {
    fn default() -> Self {
        Self {
            row: 1,
            column: 1,
            field: 1,
            time_point: 1,
            z_index: 1,
            ch: 1,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            z_image_processing: None,
        }
    }
}

impl Cq3kRecord<'_> {
    pub fn file_name(&self) -> String {
        format!(
            "W{}{}_T{:04}F{:03}L01A01Z{:02}C{:02}.tif",
            self.row, self.column, self.time_point, self.field, self.z_index, self.ch
        )
    }

    fn xml(&self) -> String {
        let processing = self
            .z_image_processing
            .map(|p| format!(r#" bts:ZImageProcessing="{p}""#))
            .unwrap_or_default();
        format!(
            r#"<bts:MeasurementRecord bts:Time="2024-01-01T00:00:00" bts:Column="{}" bts:Row="{}" bts:FieldIndex="{}" bts:TimePoint="{}" bts:TimelineIndex="0" bts:X="{}" bts:Y="{}" bts:Z="{}" bts:ZIndex="{}" bts:Ch="{}" bts:Action="Acquire" bts:ActionIndex="1" bts:Type="IMG"{}>{}</bts:MeasurementRecord>"#,
            self.column,
            self.row,
            self.field,
            self.time_point,
            self.x,
            self.y,
            self.z,
            self.z_index,
            self.ch,
            processing,
            self.file_name()
        )
    }
}

pub fn write_cq3k(root: &Path, records: &[Cq3kRecord]) {
    let body: Vec<String> = records.iter().map(Cq3kRecord::xml).collect();
    let mlf = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<bts:MeasurementData xmlns:bts="http://www.yokogawa.co.jp/BTS/BTSSchema/1.0" bts:Version="1.0">
{}
</bts:MeasurementData>"#,
        body.join("\n")
    );
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("MeasurementData.mlf"), mlf).unwrap();
    fs::write(root.join("MeasurementDetail.mrf"), CQ3K_DETAIL).unwrap();
}

/// ScanR acquisition with one single-plane image per well number
pub fn write_scanr(root: &Path, wells: &[u32]) {
    let images: Vec<String> = wells
        .iter()
        .map(|well| {
            format!(
                r#"<Image ID="Image:W{well}P1" Name="W{well}P1">
  <Pixels ID="Pixels:{well}" DimensionOrder="XYCZT" Type="uint16" SizeX="1280" SizeY="1024" SizeZ="1" SizeC="1" SizeT="1" PhysicalSizeX="0.65" PhysicalSizeXUnit="µm" PhysicalSizeY="0.65" PhysicalSizeYUnit="µm">
    <Channel ID="Channel:{well}:0" Name="DAPI" SamplesPerPixel="1"/>
    <TiffData FirstC="0" FirstT="0" FirstZ="0" IFD="0" PlaneCount="1">
      <UUID FileName="--W{well:05}--P00001--Z00000--T00000--DAPI.tif">urn:uuid:{well}</UUID>
    </TiffData>
    <Plane TheC="0" TheT="0" TheZ="0" PositionX="{x}" PositionXUnit="µm" PositionY="-50" PositionYUnit="µm" PositionZ="0"/>
  </Pixels>
</Image>"#,
                x = f64::from(*well) * 9000.0
            )
        })
        .collect();
    let ome = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06" Creator="scanR">
{}
</OME>"#,
        images.join("\n")
    );
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("metadata.ome.xml"), ome).unwrap();
}

/// Operetta acquisition with one single-plane image per (row, col)
pub fn write_operetta(root: &Path, wells: &[(u32, u32)]) {
    let images: Vec<String> = wells
        .iter()
        .map(|(row, col)| {
            format!(
                r#"<Image Version="1">
  <id>{row:02}{col:02}K1F1P1R1</id>
  <URL>r{row:02}c{col:02}f01p01-ch1sk1fk1fl1.tiff</URL>
  <Row>{row}</Row>
  <Col>{col}</Col>
  <FieldID>1</FieldID>
  <PlaneID>1</PlaneID>
  <TimepointID>0</TimepointID>
  <ChannelID>1</ChannelID>
  <ChannelName>HOECHST 33342</ChannelName>
  <ImageResolutionX Unit="m">1.1E-06</ImageResolutionX>
  <ImageResolutionY Unit="m">1.1E-06</ImageResolutionY>
  <ImageSizeX>1360</ImageSizeX>
  <ImageSizeY>1024</ImageSizeY>
  <PositionX Unit="m">0.001</PositionX>
  <PositionY Unit="m">0.002</PositionY>
  <PositionZ Unit="m">-3E-06</PositionZ>
  <AbsPositionZ Unit="m">0.1352</AbsPositionZ>
  <MaxIntensity>2048</MaxIntensity>
</Image>"#
            )
        })
        .collect();
    let index = format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<EvaluationInputData xmlns="http://www.perkinelmer.com/PEHH/HarmonyV5" Version="2">
  <Images>
{}
  </Images>
</EvaluationInputData>"#,
        images.join("\n")
    );
    let dir = root.join("Images");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Index.idx.xml"), index).unwrap();
}
