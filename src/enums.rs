use std::fmt;

/// The three orthogonal planes through the center voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// xy plane at a fixed z
    Axial,
    /// xz plane at a fixed y
    Coronal,
    /// yz plane at a fixed x
    Sagittal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Coronal,
        Orientation::Sagittal,
    ];

    /// Suffix appended to the output file stem
    pub fn suffix(&self) -> &'static str {
        match self {
            Orientation::Axial => "xy",
            Orientation::Coronal => "xz",
            Orientation::Sagittal => "yz",
        }
    }

    /// Index of the spatial axis held fixed by this plane in (x, y, z, t)
    pub fn fixed_axis(&self) -> usize {
        match self {
            Orientation::Axial => 2,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 0,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// H.264 movie per plane, encoded by ffmpeg
    #[default]
    Mp4,
    /// Directory of upsampled PNG frames per plane
    Png,
}
