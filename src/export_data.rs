use std::io::Write;

use anyhow::Result;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use itertools::Itertools;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::Config;
use crate::geofence::GeoFence;
use crate::track::{PathSegment, SpeedBand, StopEvent};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const STOP_NAME: &str = "Stop";
const KNOTS_TO_METERS_PER_SECOND: f64 = 1852.0 / 3600.0;

struct KmlDocumentWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> KmlDocumentWriter<W> {
    fn begin(out: W, name: &str) -> Result<Self> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
        ))?;
        let mut document = KmlDocumentWriter { writer };
        document.start("Document")?;
        document.text_element("name", name)?;
        Ok(document)
    }

    fn finish(mut self) -> Result<W> {
        self.end("Document")?;
        self.end("kml")?;
        let mut out = self.writer.into_inner();
        out.flush()?;
        Ok(out)
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn start_with_id(&mut self, name: &str, id: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name).with_attributes([("id", id)])))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn line_style(&mut self, band: SpeedBand, color: &str, width: f64) -> Result<()> {
        self.start_with_id("Style", &band.style_id())?;
        self.start("LineStyle")?;
        self.text_element("color", color)?;
        self.text_element("width", &width.to_string())?;
        self.end("LineStyle")?;
        self.end("Style")
    }

    fn line_string_placemark(&mut self, description: &str, segment: &PathSegment) -> Result<()> {
        let coordinates = segment
            .points
            .iter()
            .map(|p| format!("{},{},{}", p.longitude, p.latitude, p.speed_knots))
            .join(" ");
        self.start("Placemark")?;
        self.text_element("description", description)?;
        self.text_element("styleUrl", &format!("#{}", segment.band.style_id()))?;
        self.start("LineString")?;
        self.text_element("extrude", "1")?;
        self.text_element("tessellate", "1")?;
        self.text_element("altitudeMode", "relativeToGround")?;
        self.text_element("coordinates", &coordinates)?;
        self.end("LineString")?;
        self.end("Placemark")
    }

    fn point_placemark(&mut self, name: &str, description: &str, lng: f64, lat: f64) -> Result<()> {
        self.start("Placemark")?;
        self.text_element("name", name)?;
        self.text_element("description", description)?;
        self.start("Point")?;
        self.text_element("coordinates", &format!("{lng},{lat}"))?;
        self.end("Point")?;
        self.end("Placemark")
    }

    fn ground_overlay(&mut self, fence: &GeoFence) -> Result<()> {
        self.start("GroundOverlay")?;
        self.text_element("name", &fence.name)?;
        self.text_element("color", &fence.fill_color)?;
        self.text_element("altitude", &fence.altitude.to_string())?;
        self.text_element("altitudeMode", "absolute")?;
        self.start("LatLonBox")?;
        self.text_element("north", &fence.north_lat.to_string())?;
        self.text_element("south", &fence.south_lat.to_string())?;
        self.text_element("east", &fence.east_long.to_string())?;
        self.text_element("west", &fence.west_long.to_string())?;
        self.end("LatLonBox")?;
        self.end("GroundOverlay")
    }
}

/// One styled, extruded line per segment. Speed in knots is written where
/// KML expects an altitude.
pub fn write_path_kml<W: Write>(
    out: W,
    name: &str,
    segments: &[PathSegment],
    config: &Config,
    overlays: &[GeoFence],
) -> Result<W> {
    let mut document = KmlDocumentWriter::begin(out, name)?;
    for (i, band) in config.bands.iter().enumerate() {
        document.line_style(SpeedBand(i as u8 + 1), &band.color, band.width)?;
    }
    for segment in segments {
        document.line_string_placemark(&config.path_description, segment)?;
    }
    for fence in overlays {
        document.ground_overlay(fence)?;
    }
    document.finish()
}

pub fn write_hazards_kml<W: Write>(out: W, name: &str, stops: &[StopEvent]) -> Result<W> {
    let mut document = KmlDocumentWriter::begin(out, name)?;
    for stop in stops {
        document.point_placemark(STOP_NAME, &stop.description(), stop.longitude, stop.latitude)?;
    }
    document.finish()
}

pub fn path_segments_to_gpx(name: &str, segments: &[PathSegment]) -> Gpx {
    let mut track = Track::new();
    track.name = Some(name.to_owned());
    for segment in segments {
        let mut track_segment = TrackSegment::new();
        for point in &segment.points {
            let mut waypoint = Waypoint::new(Point::new(point.longitude, point.latitude));
            waypoint.speed = Some(point.speed_knots * KNOTS_TO_METERS_PER_SECOND);
            track_segment.points.push(waypoint);
        }
        track.segments.push(track_segment);
    }

    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some(env!("CARGO_PKG_NAME").to_owned());
    gpx.tracks.push(track);
    gpx
}

pub fn write_track_gpx<W: Write>(mut out: W, name: &str, segments: &[PathSegment]) -> Result<W> {
    let gpx = path_segments_to_gpx(name, segments);
    gpx::write(&gpx, &mut out)?;
    out.flush()?;
    Ok(out)
}
